use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};

pub type ChangeSet = BTreeMap<String, WorkspaceChangeType>;
pub type FileSet = BTreeSet<String>;

/// Snapshot of everything `status` reports, each set sorted by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub current_branch: BranchName,
    pub branches: Vec<BranchName>,
    pub staged_files: FileSet,
    pub removed_files: FileSet,
    pub unstaged_changes: ChangeSet,
    pub untracked_files: FileSet,
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    /// Inspect the repository; the staging area must already be loaded
    pub fn initialize(&self) -> anyhow::Result<StatusInfo> {
        let (_, head) = self.repository.head_commit()?;
        let head_tree = head.tree();
        let staging = self.repository.staging();
        let workspace = self.repository.workspace();

        let working_files = workspace.list_files()?.into_iter().collect::<FileSet>();
        let mut unstaged_changes = ChangeSet::new();
        let mut untracked_files = FileSet::new();

        for file_name in &working_files {
            let content = workspace.read_file(file_name)?;
            let blob_id = Blob::new(file_name.clone(), content.clone()).object_id();

            let change = match staging.staged_content(file_name) {
                Some(staged) if staged != &content => Some(WorkspaceChangeType::Modified),
                Some(_) => None,
                None if staging.is_removed(file_name) => {
                    untracked_files.insert(file_name.clone());
                    None
                }
                None => match head_tree.blob_for(file_name) {
                    Some(head_blob) if head_blob != &blob_id => {
                        Some(WorkspaceChangeType::Modified)
                    }
                    Some(_) => None,
                    None => {
                        untracked_files.insert(file_name.clone());
                        None
                    }
                },
            };

            if let Some(change) = change {
                unstaged_changes.insert(file_name.clone(), change);
            }
        }

        let missing = |file_name: &str| !working_files.contains(file_name);
        for file_name in staging.staged_files().filter(|name| missing(*name)) {
            unstaged_changes.insert(file_name.to_string(), WorkspaceChangeType::Deleted);
        }
        for file_name in head_tree.file_names() {
            if missing(file_name) && !staging.is_removed(file_name) && !staging.is_staged(file_name)
            {
                unstaged_changes.insert(file_name.to_string(), WorkspaceChangeType::Deleted);
            }
        }

        Ok(StatusInfo {
            current_branch: self.repository.refs().current_branch()?,
            branches: self.repository.refs().list_branches()?,
            staged_files: staging.staged_files().map(str::to_string).collect(),
            removed_files: staging.removed_files().map(str::to_string).collect(),
            unstaged_changes,
            untracked_files,
        })
    }
}
