use crate::REPOSITORY_DIR;
use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::areas::staging::StagingArea;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::graph::CommitGraph;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::status_info::Status;
use crate::errors::RepositoryError;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// One repository: its working directory and everything under `.sprout`
///
/// All operations are methods on this handle, so several repositories can be
/// open in the same process.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    staging: RefCell<StagingArea>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path);

        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path.canonicalize()?;
        let repository_path = path.join(REPOSITORY_DIR);

        let staging = StagingArea::new(repository_path.join("staging").into_boxed_path());
        let database = Database::new(repository_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(repository_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            staging: RefCell::new(staging),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn repository_path(&self) -> PathBuf {
        self.path.join(REPOSITORY_DIR)
    }

    pub fn is_initialized(&self) -> bool {
        self.repository_path().is_dir()
    }

    /// Fail with `NotInitialized` outside a repository, then load the staging area
    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if !self.is_initialized() {
            return Err(RepositoryError::NotInitialized.into());
        }

        self.staging().rehydrate()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn staging(&'_ self) -> RefMut<'_, StagingArea> {
        self.staging.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn graph(&'_ self) -> CommitGraph<'_> {
        CommitGraph::new(&self.database)
    }

    pub fn status(&'_ self) -> Status<'_> {
        Status::new(self)
    }

    /// Id and contents of the commit at the tip of the current branch
    pub fn head_commit(&self) -> anyhow::Result<(ObjectId, Commit)> {
        let head_id = self.refs.read_head()?;
        let head = self.database.load_commit(&head_id)?;

        Ok((head_id, head))
    }

    /// Tip of `name`, failing with `NoSuchBranch` if it does not exist
    pub fn branch_tip(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        self.refs.read_branch(name)?.ok_or_else(|| {
            RepositoryError::NoSuchBranch {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Expand a commit id prefix, failing with `NoSuchCommit` if it is unknown
    /// or ambiguous
    pub fn resolve_commit(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        self.graph().resolve_prefix(prefix).map_err(|err| {
            match err.downcast_ref::<RepositoryError>() {
                Some(RepositoryError::AmbiguousOrNotFound { .. }) => RepositoryError::NoSuchCommit {
                    id: prefix.to_string(),
                }
                .into(),
                _ => err,
            }
        })
    }
}
