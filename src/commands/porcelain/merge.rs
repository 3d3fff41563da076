use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::merge::conflict::render_conflict;
use crate::artifacts::merge::resolution::{MergeAction, plan_merge};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::io::Write;

/// How a merge ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The other branch was already part of the current history
    AlreadyUpToDate,
    /// The current branch moved forward to the other tip; no commit was made
    FastForwarded,
    /// A two-parent commit was created
    Merged {
        commit: ObjectId,
        conflicted: bool,
    },
}

impl Repository {
    /// Merge `branch_name` into the current branch
    pub fn merge(&mut self, branch_name: &str) -> anyhow::Result<MergeOutcome> {
        self.ensure_initialized()?;

        let (head_oid, head) = self.head_commit()?;
        let current_branch = self.refs().current_branch()?;
        let other_branch = BranchName::try_parse(branch_name.to_string())?;
        let other_oid = self.check_merge_preconditions(&head, &current_branch, &other_branch)?;

        let graph = self.graph();
        if head_oid == other_oid || graph.is_ancestor(&other_oid, &head_oid)? {
            writeln!(
                self.writer(),
                "Given branch is an ancestor of the current branch."
            )?;
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        if graph.is_ancestor(&head_oid, &other_oid)? {
            self.materialize_tree(&head_oid, &other_oid, &current_branch)?;
            writeln!(self.writer(), "Current branch fast-forwarded.")?;
            return Ok(MergeOutcome::FastForwarded);
        }

        let base_oid = graph.merge_base(&head_oid, &other_oid)?;
        tracing::info!(
            head = %head_oid.to_short_oid(),
            other = %other_oid.to_short_oid(),
            base = %base_oid.to_short_oid(),
            "merging"
        );

        let base = self.database().load_commit(&base_oid)?;
        let other = self.database().load_commit(&other_oid)?;
        let conflicted = self.apply_merge(&base, &head, &other)?;

        let message = format!("Merged {} into {}.", other_branch, current_branch);
        let commit = self.write_commit(message, Some(other_oid), true)?;

        if conflicted {
            writeln!(self.writer(), "Encountered a merge conflict.")?;
        }

        Ok(MergeOutcome::Merged { commit, conflicted })
    }

    /// Checks that run before anything is touched; returns the other tip
    fn check_merge_preconditions(
        &self,
        head: &Commit,
        current_branch: &BranchName,
        other_branch: &BranchName,
    ) -> anyhow::Result<ObjectId> {
        if !self.staging().is_empty() {
            return Err(RepositoryError::DirtyStagingArea.into());
        }

        let other_oid = self.branch_tip(other_branch)?;
        if other_branch == current_branch {
            return Err(RepositoryError::SelfMerge.into());
        }

        let untracked = self
            .workspace()
            .list_files()?
            .into_iter()
            .filter(|file_name| !head.tree().contains(file_name))
            .collect::<Vec<_>>();
        if !untracked.is_empty() {
            return Err(RepositoryError::UntrackedObstruction {
                file_names: untracked,
            }
            .into());
        }

        Ok(other_oid)
    }

    /// Apply the per-file merge plan to the working directory and staging
    /// area; returns whether any file conflicted
    fn apply_merge(&self, base: &Commit, head: &Commit, other: &Commit) -> anyhow::Result<bool> {
        let plan = plan_merge(base.tree(), head.tree(), other.tree());
        let mut staging = self.staging();
        let mut conflicted = false;

        for (file_name, action) in plan {
            tracing::debug!(file = %file_name, ?action, "merge action");

            match action {
                MergeAction::Keep => {}
                MergeAction::TakeOther(blob_oid) => {
                    let content = self.database().load_blob(&blob_oid)?;
                    self.workspace().write_file(&file_name, &content)?;
                    staging.stage(self.database(), &file_name, content, head.tree())?;
                }
                MergeAction::Remove => {
                    let working_content = self.workspace().try_read_file(&file_name)?;
                    staging.unstage_for_removal(&file_name, head.tree(), working_content)?;
                    self.workspace().remove_file(&file_name)?;
                }
                MergeAction::Conflict {
                    head: head_blob,
                    other: other_blob,
                } => {
                    let head_content = self.load_optional_blob(head_blob.as_ref())?;
                    let other_content = self.load_optional_blob(other_blob.as_ref())?;
                    let content = render_conflict(head_content.as_deref(), other_content.as_deref());

                    self.workspace().write_file(&file_name, &content)?;
                    conflicted = true;
                }
            }
        }

        staging.write_updates()?;

        Ok(conflicted)
    }

    fn load_optional_blob(&self, blob_oid: Option<&ObjectId>) -> anyhow::Result<Option<bytes::Bytes>> {
        blob_oid
            .map(|blob_oid| self.database().load_blob(blob_oid))
            .transpose()
    }
}
