//! Working directory reconciliation
//!
//! Switching the working directory from one commit's tree to another is
//! planned first and applied second, so a checkout that would clobber an
//! untracked file fails before anything on disk changes.

pub mod migration;
