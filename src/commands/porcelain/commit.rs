use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Commit, load_timestamp_from_env};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    pub fn commit(&mut self, message: &str) -> anyhow::Result<ObjectId> {
        self.ensure_initialized()?;

        let message = message.trim();
        if message.is_empty() {
            return Err(RepositoryError::EmptyMessage.into());
        }

        let commit_oid = self.write_commit(message.to_string(), None, false)?;

        Ok(commit_oid)
    }

    /// Turn the staged changes into a commit on the current branch
    ///
    /// Writes happen in order: objects, then the branch ref, then the cleared
    /// staging area. With `allow_empty` an empty staging area yields a commit
    /// with HEAD's tree instead of `NoChanges`.
    pub(crate) fn write_commit(
        &self,
        message: String,
        second_parent: Option<ObjectId>,
        allow_empty: bool,
    ) -> anyhow::Result<ObjectId> {
        let (head_oid, head) = self.head_commit()?;
        let current_branch = self.refs().current_branch()?;
        let mut staging = self.staging();

        let tree = if allow_empty && staging.is_empty() {
            head.tree().clone()
        } else {
            staging.materialize_commit(self.database(), head.tree())?
        };

        let commit = Commit::new(
            message,
            load_timestamp_from_env(),
            Some(head_oid),
            second_parent,
            tree,
        );
        let commit_oid = self.database().store_commit(&commit)?;
        self.refs().update_branch(&current_branch, &commit_oid)?;

        staging.clear();
        staging.write_updates()?;

        tracing::info!(branch = %current_branch, oid = %commit_oid, "created commit");
        writeln!(
            self.writer(),
            "[{} {}] {}",
            current_branch,
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_oid)
    }
}
