//! Working tree status inspection
//!
//! Compares the working directory against the staging area and the HEAD
//! commit.
//!
//! ## Components
//!
//! - `file_change`: categories of unstaged changes
//! - `status_info`: status information aggregation

pub mod file_change;
pub mod status_info;
