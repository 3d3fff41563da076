//! Commit history traversal for `log`
//!
//! - `rev_list`: first-parent walk from a commit back to the root

pub mod rev_list;
