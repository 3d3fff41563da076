//! Repository error taxonomy
//!
//! Every precondition an operation can fail on has a variant here. Operations
//! return `anyhow::Result` and use these values as the root cause, so callers
//! can recover the variant with `downcast_ref::<RepositoryError>()`.

use crate::artifacts::objects::object_id::ObjectId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// a blob, commit or ref that should exist is missing
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// a commit id prefix matched zero or several commits
    #[error("No commit with that id exists: {prefix} is ambiguous or unknown")]
    AmbiguousOrNotFound { prefix: String },

    #[error("No commit with that id exists.")]
    NoSuchCommit { id: String },

    #[error("File does not exist in that commit.")]
    FileNotInCommit { file_name: String },

    #[error("File does not exist.")]
    FileNotFound { file_name: String },

    /// the name is not a single plain entry of the working directory
    #[error("Invalid file name: {file_name}")]
    InvalidFileName { file_name: String },

    #[error("No changes added to the commit.")]
    NoChanges,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No reason to remove the file.")]
    NothingToRemove { file_name: String },

    #[error(
        "There is an untracked file in the way; delete it, or add and commit it first. ({})",
        file_names.join(", ")
    )]
    UntrackedFileWouldBeOverwritten { file_names: Vec<String> },

    #[error(
        "There is an untracked file in the way; delete it, or add and commit it first. ({})",
        file_names.join(", ")
    )]
    UntrackedObstruction { file_names: Vec<String> },

    #[error("You have uncommitted changes.")]
    DirtyStagingArea,

    #[error("Cannot merge a branch with itself.")]
    SelfMerge,

    #[error("No such branch exists: {name}")]
    NoSuchBranch { name: String },

    #[error("A branch with that name already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Cannot remove the current branch.")]
    CurrentBranchProtected { name: String },

    #[error("No need to checkout the current branch.")]
    AlreadyOnBranch { name: String },

    #[error("invalid branch name: {name}")]
    InvalidBranchName { name: String },

    #[error("Found no commit with that message.")]
    NoCommitWithMessage,

    #[error("A sprout version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("Not in an initialized sprout directory.")]
    NotInitialized,
}

impl RepositoryError {
    pub fn blob_not_found(oid: &ObjectId) -> Self {
        RepositoryError::NotFound {
            kind: "blob",
            id: oid.to_string(),
        }
    }

    pub fn commit_not_found(oid: &ObjectId) -> Self {
        RepositoryError::NotFound {
            kind: "commit",
            id: oid.to_string(),
        }
    }
}
