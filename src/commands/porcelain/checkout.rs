use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    /// Restore one file from a commit (HEAD when `commit` is None)
    ///
    /// The working copy is overwritten; the staging area is left alone.
    pub fn checkout_file(&mut self, commit: Option<&str>, file_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        Workspace::validate_file_name(file_name)?;

        let commit_oid = match commit {
            Some(prefix) => self.resolve_commit(prefix)?,
            None => self.refs().read_head()?,
        };
        self.materialize_file(&commit_oid, file_name)
    }

    /// Overwrite the working copy of `file_name` with its version in a commit
    ///
    /// Fails with `FileNotInCommit` if the commit does not track the file.
    pub(crate) fn materialize_file(
        &self,
        commit_oid: &ObjectId,
        file_name: &str,
    ) -> anyhow::Result<()> {
        let commit = self.database().load_commit(commit_oid)?;

        let blob_oid =
            commit
                .tree()
                .blob_for(file_name)
                .ok_or_else(|| RepositoryError::FileNotInCommit {
                    file_name: file_name.to_string(),
                })?;
        let content = self.database().load_blob(blob_oid)?;
        self.workspace().write_file(file_name, &content)?;

        Ok(())
    }

    /// Switch to another branch
    pub fn checkout_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        let branch_name = BranchName::try_parse(branch_name.to_string())?;

        let target_oid = self.branch_tip(&branch_name)?;
        if self.refs().is_current_branch(&branch_name)? {
            return Err(RepositoryError::AlreadyOnBranch {
                name: branch_name.to_string(),
            }
            .into());
        }

        let head_oid = self.refs().read_head()?;
        self.materialize_tree(&head_oid, &target_oid, &branch_name)?;

        writeln!(self.writer(), "Switched to branch '{}'", branch_name)?;

        Ok(())
    }

    /// Replace the working tree of `from` with the one of `to`
    ///
    /// Fails with `UntrackedFileWouldBeOverwritten` before touching anything if
    /// a file only `to` tracks is already present. On success the staging area
    /// is cleared, `branch` points at `to` and HEAD at `branch`.
    pub(crate) fn materialize_tree(
        &self,
        from: &ObjectId,
        to: &ObjectId,
        branch: &BranchName,
    ) -> anyhow::Result<()> {
        let from_commit = self.database().load_commit(from)?;
        let to_commit = self.database().load_commit(to)?;

        let mut migration = Migration::new(self, from_commit.tree(), to_commit.tree());
        migration.apply_changes()?;

        {
            let mut staging = self.staging();
            staging.clear();
            staging.write_updates()?;
        }

        self.refs().update_branch(branch, to)?;
        self.refs().set_head(branch)?;

        Ok(())
    }
}
