//! Commit graph queries
//!
//! Read-only view over the commits in the object database: parent lookups,
//! ancestry, id prefix resolution and merge base search. Commits are loaded
//! lazily and memoized for the lifetime of the graph.

use crate::areas::database::{CommitCache, Database};
use crate::artifacts::merge::bca_finder::BCAFinder;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::collections::{HashSet, VecDeque};

pub struct CommitGraph<'r> {
    database: &'r Database,
    cache: CommitCache,
}

impl<'r> CommitGraph<'r> {
    pub fn new(database: &'r Database) -> Self {
        Self {
            database,
            cache: CommitCache::new(),
        }
    }

    pub fn parent_of(&self, commit_id: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        Ok(self.parents(commit_id)?.into_iter().next())
    }

    pub fn second_parent_of(&self, commit_id: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        Ok(self.parents(commit_id)?.into_iter().nth(1))
    }

    /// Whether `ancestor` is reachable from `descendant` over either parent edge
    ///
    /// Every commit is its own ancestor.
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([descendant.clone()]);

        while let Some(commit_id) = queue.pop_front() {
            if &commit_id == ancestor {
                return Ok(true);
            }
            if visited.insert(commit_id.clone()) {
                queue.extend(self.parents(&commit_id)?);
            }
        }

        Ok(false)
    }

    /// Expand an abbreviated commit id
    ///
    /// Full-length ids must exist; shorter ones must match exactly one stored
    /// commit. Anything else fails with `AmbiguousOrNotFound`.
    pub fn resolve_prefix(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        let not_found = || RepositoryError::AmbiguousOrNotFound {
            prefix: prefix.to_string(),
        };

        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(not_found().into());
        }

        if prefix.len() == OBJECT_ID_LENGTH {
            let commit_id = ObjectId::try_parse(prefix.to_string())?;
            return if self.database.commit_exists(&commit_id) {
                Ok(commit_id)
            } else {
                Err(not_found().into())
            };
        }

        let mut matches = self.database.find_commits_by_prefix(prefix)?;
        match matches.len() {
            1 => Ok(matches.remove(0)),
            _ => Err(not_found().into()),
        }
    }

    /// Lowest common ancestor of two commits
    pub fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> anyhow::Result<ObjectId> {
        let finder =
            BCAFinder::new(|commit_id| self.cache.get_or_load_slim_commit(self.database, commit_id));

        finder
            .find_best_common_ancestor(a, b)?
            .ok_or_else(|| anyhow::anyhow!("commits {} and {} share no history", a, b))
    }

    fn parents(&self, commit_id: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        Ok(self
            .cache
            .get_or_load_slim_commit(self.database, commit_id)?
            .parents)
    }
}
