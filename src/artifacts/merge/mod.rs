//! Three-way merge building blocks
//!
//! - `bca_finder`: merge base search over the commit graph
//! - `resolution`: per-file classification against base, HEAD and other
//! - `conflict`: conflict marker rendering

pub mod bca_finder;
pub mod conflict;
pub mod resolution;
