//! Checkout migration
//!
//! Moves the working directory from the tree of one commit (`from`) to the
//! tree of another (`to`):
//!
//! 1. Plan: files only in `to` are added, files in both are rewritten, files
//!    only in `from` are deleted
//! 2. Check: a file about to be added that already exists in the working
//!    directory is untracked by `from` and would be overwritten
//! 3. Apply: only if the check found nothing
//!
//! Staging and ref updates are left to the caller.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::FileTree;
use crate::errors::RepositoryError;
use bytes::Bytes;
use std::collections::{BTreeSet, HashMap};

/// Type of file system action required for checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Create new file
    Add,
    /// Delete file
    Delete,
    /// Rewrite a file tracked on both sides
    Modify,
}

/// Planned actions grouped by type, each with the blob involved
pub type ActionsSet = HashMap<ActionType, Vec<(String, ObjectId)>>;

pub struct Migration<'r> {
    repository: &'r Repository,
    from: &'r FileTree,
    to: &'r FileTree,
    actions: ActionsSet,
    /// Untracked files that the checkout would overwrite
    conflicts: BTreeSet<String>,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, from: &'r FileTree, to: &'r FileTree) -> Self {
        let actions = HashMap::from([
            (ActionType::Add, Vec::new()),
            (ActionType::Delete, Vec::new()),
            (ActionType::Modify, Vec::new()),
        ]);

        Self {
            repository,
            from,
            to,
            actions,
            conflicts: BTreeSet::new(),
        }
    }

    pub fn actions_of(&self, action: ActionType) -> impl Iterator<Item = (&str, &ObjectId)> {
        self.actions
            .get(&action)
            .into_iter()
            .flatten()
            .map(|(file_name, oid)| (file_name.as_str(), oid))
    }

    pub fn apply_changes(&mut self) -> anyhow::Result<()> {
        self.plan_changes()?;
        self.repository.workspace().apply_migration(self)?;

        tracing::debug!(
            added = self.actions[&ActionType::Add].len(),
            modified = self.actions[&ActionType::Modify].len(),
            deleted = self.actions[&ActionType::Delete].len(),
            "reconciled working directory"
        );
        Ok(())
    }

    fn plan_changes(&mut self) -> anyhow::Result<()> {
        let (from, to) = (self.from, self.to);

        for (oid, file_name) in to.entries() {
            let action = if from.contains(file_name) {
                ActionType::Modify
            } else {
                self.check_for_conflict(file_name);
                ActionType::Add
            };
            self.record_change(action, file_name, oid);
        }

        for (oid, file_name) in from.entries() {
            if !to.contains(file_name) {
                self.record_change(ActionType::Delete, file_name, oid);
            }
        }

        if !self.conflicts.is_empty() {
            return Err(RepositoryError::UntrackedFileWouldBeOverwritten {
                file_names: self.conflicts.iter().cloned().collect(),
            }
            .into());
        }

        Ok(())
    }

    fn check_for_conflict(&mut self, file_name: &str) {
        if self.repository.workspace().exists(file_name) {
            self.conflicts.insert(file_name.to_string());
        }
    }

    fn record_change(&mut self, action: ActionType, file_name: &str, oid: &ObjectId) {
        self.actions
            .entry(action)
            .or_default()
            .push((file_name.to_string(), oid.clone()));
    }

    pub fn load_blob_data(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        self.repository.database().load_blob(object_id)
    }
}
