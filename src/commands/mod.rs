//! Command implementations
//!
//! - `porcelain`: user-facing version control workflows (add, commit, log, merge, etc.)

pub mod porcelain;
