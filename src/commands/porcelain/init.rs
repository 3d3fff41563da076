use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    /// Create the repository layout with the root commit on `main`
    pub fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(RepositoryError::AlreadyInitialized.into());
        }

        for object_type in [ObjectType::Blob, ObjectType::Commit] {
            fs::create_dir_all(self.database().partition_path(object_type))
                .context("Failed to create .sprout/objects directory")?;
        }
        fs::create_dir_all(self.refs().branches_path())
            .context("Failed to create .sprout/branches directory")?;
        fs::create_dir_all(self.staging().path())
            .context("Failed to create .sprout/staging directory")?;

        let root_oid = self.database().store_commit(&Commit::root())?;
        let main = BranchName::default_branch();
        self.refs()
            .update_branch(&main, &root_oid)
            .context("Failed to create the default branch")?;
        self.refs()
            .set_head(&main)
            .context("Failed to create initial HEAD reference")?;

        tracing::info!(root = %root_oid, "initialized repository");
        writeln!(
            self.writer(),
            "Initialized empty sprout repository in {}",
            self.repository_path().display()
        )?;

        Ok(())
    }
}
