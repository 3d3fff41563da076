//! Object types and operations
//!
//! All content is stored as immutable objects identified by SHA-1 hashes:
//!
//! - **Blob**: the content of one file, addressed by its name and bytes
//! - **Commit**: a snapshot (the file tree) with message, timestamp and parents
//!
//! Objects are framed as `<type> <size>\0<payload>` before being written
//! to the object database.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
