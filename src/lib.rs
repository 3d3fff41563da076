//! sprout - a small content-addressed version control engine
//!
//! The crate is split the same way the repository is laid out on disk:
//!
//! - `areas`: persistent state (object database, refs, staging area, workspace)
//!   and the `Repository` handle that owns one of each
//! - `artifacts`: object types and the algorithms that operate on them
//!   (commit graph, checkout reconciliation, three-way merge)
//! - `commands`: user-facing operations, each implemented on `Repository`
//! - `errors`: the typed failures reported by those operations

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

/// Name of the directory holding all repository state
pub const REPOSITORY_DIR: &str = ".sprout";

/// Branch created by `init` and checked out by default
pub const DEFAULT_BRANCH: &str = "main";
