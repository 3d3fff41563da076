//! Data structures and algorithms
//!
//! - `branch`: branch name validation
//! - `checkout`: working directory reconciliation between two trees
//! - `core`: shared utilities (pager wrapper)
//! - `graph`: commit graph queries (ancestry, prefix resolution, merge base)
//! - `log`: commit history traversal
//! - `merge`: merge base search, three-way classification, conflict markers
//! - `objects`: object types (blob, tree, commit)
//! - `status`: working tree status inspection

pub mod branch;
pub mod checkout;
pub mod core;
pub mod graph;
pub mod log;
pub mod merge;
pub mod objects;
pub mod status;
