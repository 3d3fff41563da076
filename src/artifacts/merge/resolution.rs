//! Per-file three-way classification
//!
//! Each file name in the union of the base, HEAD and other trees is
//! classified by comparing the blob it has on each side. Blob ids cover the
//! file name and the content, so within one name equal ids mean equal content.
//! The first matching rule wins:
//!
//! | base | HEAD | other | condition          | action     |
//! |------|------|-------|--------------------|------------|
//! | S    | H    | O     | S = H, H ≠ O       | take other |
//! | S    | H    | O     | S = O, H ≠ S       | keep       |
//! | any  | H?   | O?    | H = O (or both -)  | keep       |
//! | -    | H    | -     |                    | keep       |
//! | -    | -    | O     |                    | take other |
//! | S    | H    | -     | S = H              | remove     |
//! | S    | -    | O     | S = O              | keep       |
//! | otherwise                                || conflict   |

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::FileTree;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAction {
    /// Leave the HEAD version (or its absence) as is
    Keep,
    /// Check out the other side's blob and stage it
    TakeOther(ObjectId),
    /// Stage the removal and delete the working copy
    Remove,
    /// Both sides changed the file differently
    Conflict {
        head: Option<ObjectId>,
        other: Option<ObjectId>,
    },
}

pub fn classify(
    base: Option<&ObjectId>,
    head: Option<&ObjectId>,
    other: Option<&ObjectId>,
) -> MergeAction {
    match (base, head, other) {
        (Some(s), Some(h), Some(o)) if s == h && h != o => MergeAction::TakeOther(o.clone()),
        (Some(s), Some(h), Some(o)) if s == o && h != s => MergeAction::Keep,
        (_, h, o) if h == o => MergeAction::Keep,
        (None, Some(_), None) => MergeAction::Keep,
        (None, None, Some(o)) => MergeAction::TakeOther(o.clone()),
        (Some(s), Some(h), None) if s == h => MergeAction::Remove,
        (Some(s), None, Some(o)) if s == o => MergeAction::Keep,
        (_, h, o) => MergeAction::Conflict {
            head: h.cloned(),
            other: o.cloned(),
        },
    }
}

/// Classify every file known to any of the three trees, sorted by name
pub fn plan_merge(
    base: &FileTree,
    head: &FileTree,
    other: &FileTree,
) -> BTreeMap<String, MergeAction> {
    let file_names = base
        .file_names()
        .into_iter()
        .chain(head.file_names())
        .chain(other.file_names());

    file_names
        .map(|file_name| {
            let action = classify(
                base.blob_for(file_name),
                head.blob_for(file_name),
                other.blob_for(file_name),
            );
            (file_name.to_string(), action)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn oid(fill: char) -> ObjectId {
        ObjectId::try_parse(fill.to_string().repeat(40)).unwrap()
    }

    fn side(fill: Option<char>) -> Option<ObjectId> {
        fill.map(oid)
    }

    #[rstest]
    // only other changed
    #[case(Some('a'), Some('a'), Some('c'), MergeAction::TakeOther(oid('c')))]
    // only HEAD changed
    #[case(Some('a'), Some('b'), Some('a'), MergeAction::Keep)]
    // both made the same change
    #[case(Some('a'), Some('b'), Some('b'), MergeAction::Keep)]
    // untouched
    #[case(Some('a'), Some('a'), Some('a'), MergeAction::Keep)]
    // both deleted
    #[case(Some('a'), None, None, MergeAction::Keep)]
    // both added the same content
    #[case(None, Some('b'), Some('b'), MergeAction::Keep)]
    // added on HEAD only
    #[case(None, Some('b'), None, MergeAction::Keep)]
    // added on other only
    #[case(None, None, Some('c'), MergeAction::TakeOther(oid('c')))]
    // deleted on other, untouched on HEAD
    #[case(Some('a'), Some('a'), None, MergeAction::Remove)]
    // deleted on HEAD, untouched on other
    #[case(Some('a'), None, Some('a'), MergeAction::Keep)]
    fn classifies_clean_cases(
        #[case] base: Option<char>,
        #[case] head: Option<char>,
        #[case] other: Option<char>,
        #[case] expected: MergeAction,
    ) {
        assert_eq!(
            classify(side(base).as_ref(), side(head).as_ref(), side(other).as_ref()),
            expected
        );
    }

    #[rstest]
    // both changed differently
    #[case(Some('a'), Some('b'), Some('c'))]
    // both added different content
    #[case(None, Some('b'), Some('c'))]
    // changed on HEAD, deleted on other
    #[case(Some('a'), Some('b'), None)]
    // deleted on HEAD, changed on other
    #[case(Some('a'), None, Some('c'))]
    fn classifies_conflicts(
        #[case] base: Option<char>,
        #[case] head: Option<char>,
        #[case] other: Option<char>,
    ) {
        assert_eq!(
            classify(side(base).as_ref(), side(head).as_ref(), side(other).as_ref()),
            MergeAction::Conflict {
                head: side(head),
                other: side(other),
            }
        );
    }

    #[test]
    fn plan_covers_the_union_of_all_trees() {
        let base: FileTree = [(oid('a'), "f.txt".to_string())].into_iter().collect();
        let head: FileTree = [(oid('b'), "f.txt".to_string())].into_iter().collect();
        let other: FileTree = [
            (oid('a'), "f.txt".to_string()),
            (oid('c'), "g.txt".to_string()),
        ]
        .into_iter()
        .collect();

        let plan = plan_merge(&base, &head, &other);

        assert_eq!(
            plan.into_iter().collect::<Vec<_>>(),
            vec![
                ("f.txt".to_string(), MergeAction::Keep),
                ("g.txt".to_string(), MergeAction::TakeOther(oid('c'))),
            ]
        );
    }
}
