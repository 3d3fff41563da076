//! Best common ancestor finder for merge operations
//!
//! Finds the merge base of two commits: the common ancestor a three-way merge
//! uses as its reference point.
//!
//! ## Algorithm Overview
//!
//! ### Phase 1: Find All Common Ancestors
//!
//! Both tips are walked breadth-first over every parent edge (first and second
//! parent alike). Each commit records which side reached it and its BFS
//! distance from each side. Commits reached from both sides are the common
//! ancestors.
//!
//! ### Phase 2: Filter to Best Common Ancestors
//!
//! > A best common ancestor of commits X and Y is any common ancestor of X and Y
//! > that is not an ancestor of any other common ancestor.
//!
//! Every strict ancestor of a common ancestor is itself common, so a single walk
//! seeded with the parents of all common ancestors marks exactly the redundant
//! ones.
//!
//! ### Phase 3: Pick One
//!
//! Criss-cross histories can leave several best common ancestors. The one with
//! the smallest `(dist_source + dist_target, max(dist_source, dist_target), id)`
//! wins, so the result is deterministic and does not depend on argument order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let finder = BCAFinder::new(|commit_id| cache.get_or_load_slim_commit(database, commit_id));
//! let base = finder.find_best_common_ancestor(&head, &other)?;
//! ```

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
        const VISITED_FROM_BOTH = Self::VISITED_FROM_SOURCE.bits() | Self::VISITED_FROM_TARGET.bits();
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_SOURCE) {
            flags.push("SOURCE");
        }
        if self.contains(VisitState::VISITED_FROM_TARGET) {
            flags.push("TARGET");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

/// Visit flags and BFS distances of one commit
#[derive(Debug, Clone, Copy)]
struct Visit {
    state: VisitState,
    source_distance: usize,
    target_distance: usize,
}

impl Visit {
    fn rank(&self) -> (usize, usize) {
        (
            self.source_distance + self.target_distance,
            self.source_distance.max(self.target_distance),
        )
    }
}

/// Best common ancestor finder
///
/// Generic over how commits are loaded, so it runs the same against the
/// object database and against in-memory graphs.
///
/// # Type Parameters
///
/// * `CommitLoaderFn` - Loads the parents of a commit; fails if the commit is
///   missing from the store
pub struct BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Find the best common ancestor of two commits
    ///
    /// # Returns
    ///
    /// - `Some(ObjectId)` - the best common ancestor (the commit itself when
    ///   both ids are equal, the older one when one is an ancestor of the other)
    /// - `None` - the commits share no history
    pub fn find_best_common_ancestor(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let common_ancestors = self.find_common_ancestors(source_commit_id, target_commit_id)?;
        if common_ancestors.is_empty() {
            return Ok(None);
        }

        let redundant_ancestors = self.ancestors_of(common_ancestors.keys())?;

        let best_common_ancestor = common_ancestors
            .into_iter()
            .filter(|(commit_id, _)| !redundant_ancestors.contains(commit_id))
            .min_by(|(a_id, a), (b_id, b)| a.rank().cmp(&b.rank()).then_with(|| a_id.cmp(b_id)))
            .map(|(commit_id, _)| commit_id);

        tracing::debug!(
            source = %source_commit_id,
            target = %target_commit_id,
            base = ?best_common_ancestor.as_ref().map(ObjectId::to_short_oid),
            "found merge base"
        );

        Ok(best_common_ancestor)
    }

    /// Walk both sides and keep the commits reached from both
    fn find_common_ancestors(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<HashMap<ObjectId, Visit>> {
        let source_distances = self.distances_from(source_commit_id)?;
        let target_distances = self.distances_from(target_commit_id)?;

        let mut visits = HashMap::<ObjectId, Visit>::new();
        for (commit_id, distance) in &source_distances {
            visits.insert(
                commit_id.clone(),
                Visit {
                    state: VisitState::VISITED_FROM_SOURCE,
                    source_distance: *distance,
                    target_distance: 0,
                },
            );
        }
        for (commit_id, distance) in target_distances {
            let visit = visits.entry(commit_id).or_insert(Visit {
                state: VisitState::NONE,
                source_distance: 0,
                target_distance: 0,
            });
            visit.state |= VisitState::VISITED_FROM_TARGET;
            visit.target_distance = distance;
        }

        Ok(visits
            .into_iter()
            .filter(|(_, visit)| visit.state.contains(VisitState::VISITED_FROM_BOTH))
            .collect())
    }

    /// Breadth-first distances from `start` to every ancestor, `start` included
    fn distances_from(&self, start: &ObjectId) -> anyhow::Result<HashMap<ObjectId, usize>> {
        let mut distances = HashMap::from([(start.clone(), 0)]);
        let mut queue = VecDeque::from([start.clone()]);

        while let Some(commit_id) = queue.pop_front() {
            let distance = distances[&commit_id];
            for parent_id in (self.commit_loader)(&commit_id)?.parents {
                if !distances.contains_key(&parent_id) {
                    distances.insert(parent_id.clone(), distance + 1);
                    queue.push_back(parent_id);
                }
            }
        }

        Ok(distances)
    }

    /// Every strict ancestor of the given commits
    fn ancestors_of<'a>(
        &self,
        commit_ids: impl Iterator<Item = &'a ObjectId>,
    ) -> anyhow::Result<HashSet<ObjectId>> {
        let mut reached = HashSet::new();
        let mut queue = VecDeque::new();

        for commit_id in commit_ids {
            queue.extend((self.commit_loader)(commit_id)?.parents);
        }
        while let Some(commit_id) = queue.pop_front() {
            if reached.insert(commit_id.clone()) {
                queue.extend((self.commit_loader)(&commit_id)?.parents);
            }
        }

        Ok(reached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::collections::HashMap;

    /// In-memory commit store for testing
    #[derive(Debug, Clone, Default)]
    struct InMemoryCommitStore {
        commits: HashMap<ObjectId, Vec<ObjectId>>,
    }

    impl InMemoryCommitStore {
        fn add_commit(&mut self, commit_id: &str, parents: &[&str]) {
            self.commits.insert(
                create_oid(commit_id),
                parents.iter().map(|parent| create_oid(parent)).collect(),
            );
        }

        fn get_slim_commit(&self, commit_id: &ObjectId) -> anyhow::Result<SlimCommit> {
            let parents = self
                .commits
                .get(commit_id)
                .ok_or_else(|| anyhow::anyhow!("commit {} not in test store", commit_id))?;

            Ok(SlimCommit {
                oid: commit_id.clone(),
                parents: parents.clone(),
            })
        }

        fn merge_base(&self, a: &str, b: &str) -> Option<ObjectId> {
            BCAFinder::new(|oid| self.get_slim_commit(oid))
                .find_best_common_ancestor(&create_oid(a), &create_oid(b))
                .unwrap()
        }
    }

    fn create_oid(id: &str) -> ObjectId {
        // Create a deterministic 40-character hex ObjectId from string for testing
        let mut hex_string = id
            .as_bytes()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<String>();

        while hex_string.len() < 40 {
            hex_string.push('0');
        }
        hex_string.truncate(40);

        ObjectId::try_parse(hex_string).unwrap()
    }

    /// A <- B <- C <- D
    #[fixture]
    fn linear_history() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();
        store.add_commit("A", &[]);
        store.add_commit("B", &["A"]);
        store.add_commit("C", &["B"]);
        store.add_commit("D", &["C"]);
        store
    }

    /// ```text
    ///     A
    ///    / \
    ///   B   C
    ///   |   |
    ///   D   E
    /// ```
    #[fixture]
    fn simple_fork() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();
        store.add_commit("A", &[]);
        store.add_commit("B", &["A"]);
        store.add_commit("C", &["A"]);
        store.add_commit("D", &["B"]);
        store.add_commit("E", &["C"]);
        store
    }

    /// ```text
    ///     A
    ///    / \
    ///   B   C
    ///   |\ /|
    ///   | X |
    ///   |/ \|
    ///   D   E
    ///   |   |
    ///   F   G
    /// ```
    #[fixture]
    fn criss_cross_merge() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();
        store.add_commit("A", &[]);
        store.add_commit("B", &["A"]);
        store.add_commit("C", &["A"]);
        store.add_commit("D", &["B", "C"]);
        store.add_commit("E", &["C", "B"]);
        store.add_commit("F", &["D"]);
        store.add_commit("G", &["E"]);
        store
    }

    /// Main merged a feature branch (M) and kept going; the feature branch
    /// kept going from its old tip. The feature tip F2 reaches the fork
    /// point R through its own history, while main reaches F1 through the
    /// second parent of M.
    ///
    /// ```text
    ///   R - M1 - M2 - M(M2, F1) - M3
    ///    \               /
    ///     F0 ---------- F1 - F2
    /// ```
    #[fixture]
    fn asymmetric_merge_history() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();
        store.add_commit("R", &[]);
        store.add_commit("M1", &["R"]);
        store.add_commit("M2", &["M1"]);
        store.add_commit("F0", &["R"]);
        store.add_commit("F1", &["F0"]);
        store.add_commit("M", &["M2", "F1"]);
        store.add_commit("M3", &["M"]);
        store.add_commit("F2", &["F1"]);
        store
    }

    #[rstest]
    #[case("D", "B", "B")]
    #[case("B", "D", "B")]
    #[case("C", "C", "C")]
    #[case("A", "D", "A")]
    fn test_linear_history_common_ancestor(
        linear_history: InMemoryCommitStore,
        #[case] source: &str,
        #[case] target: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(
            linear_history.merge_base(source, target),
            Some(create_oid(expected))
        );
    }

    #[rstest]
    fn test_simple_fork_common_ancestor(simple_fork: InMemoryCommitStore) {
        assert_eq!(simple_fork.merge_base("D", "E"), Some(create_oid("A")));
        assert_eq!(simple_fork.merge_base("B", "E"), Some(create_oid("A")));
    }

    #[rstest]
    fn test_criss_cross_merge_picks_one_best_ancestor_either_way(
        criss_cross_merge: InMemoryCommitStore,
    ) {
        let forward = criss_cross_merge.merge_base("F", "G");
        let backward = criss_cross_merge.merge_base("G", "F");

        assert_eq!(forward, backward);
        assert!(
            forward == Some(create_oid("B")) || forward == Some(create_oid("C")),
            "expected B or C, got {:?}",
            forward
        );
    }

    #[rstest]
    fn test_asymmetric_history_finds_the_lowest_ancestor(
        asymmetric_merge_history: InMemoryCommitStore,
    ) {
        // R is common too, but it is an ancestor of F1
        assert_eq!(
            asymmetric_merge_history.merge_base("M3", "F2"),
            Some(create_oid("F1"))
        );
        assert_eq!(
            asymmetric_merge_history.merge_base("F2", "M3"),
            Some(create_oid("F1"))
        );
    }

    #[rstest]
    fn test_merge_commit_as_common_ancestor() {
        let mut store = InMemoryCommitStore::default();
        store.add_commit("A", &[]);
        store.add_commit("B", &["A"]);
        store.add_commit("C", &["A"]);
        store.add_commit("M", &["B", "C"]);
        store.add_commit("X", &["M"]);
        store.add_commit("Y", &["M"]);

        assert_eq!(store.merge_base("X", "Y"), Some(create_oid("M")));
    }

    #[rstest]
    fn test_no_common_ancestor_different_roots() {
        let mut store = InMemoryCommitStore::default();
        store.add_commit("A", &[]);
        store.add_commit("B", &["A"]);
        store.add_commit("X", &[]);
        store.add_commit("Y", &["X"]);

        assert_eq!(store.merge_base("B", "Y"), None);
    }

    #[rstest]
    fn test_missing_commit_is_an_error(linear_history: InMemoryCommitStore) {
        let result = BCAFinder::new(|oid| linear_history.get_slim_commit(oid))
            .find_best_common_ancestor(&create_oid("D"), &create_oid("nope"));

        assert!(result.is_err());
    }

    #[test]
    fn visit_state_debug_lists_flags() {
        assert_eq!(format!("{:?}", VisitState::VISITED_FROM_BOTH), "SOURCE|TARGET");
        assert_eq!(format!("{:?}", VisitState::NONE), "NONE");
    }
}
