use crate::areas::repository::Repository;

impl Repository {
    /// Move the current branch to a commit and check out its tree
    pub fn reset(&mut self, commit: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let target_oid = self.resolve_commit(commit)?;
        let head_oid = self.refs().read_head()?;
        let current_branch = self.refs().current_branch()?;

        self.materialize_tree(&head_oid, &target_oid, &current_branch)?;
        tracing::info!(branch = %current_branch, oid = %target_oid, "reset branch");

        Ok(())
    }
}
