//! Porcelain commands (user-facing operations)
//!
//! Each command is a method on `Repository`. Commands check their
//! preconditions first and only then touch the working directory, the
//! staging area or the refs.
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository with the root commit
//! - `add`: Stage a file for the next commit
//! - `rm`: Unstage a file or stage it for removal
//! - `commit`: Create a new commit from the staging area
//! - `log` / `global-log` / `find`: Inspect commit history
//! - `status`: Show branches, staged files and working tree changes
//! - `branch` / `rm-branch`: Create or delete branches
//! - `checkout`: Switch branches or restore files
//! - `reset`: Move the current branch to another commit
//! - `merge`: Three-way merge another branch into the current one

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
