//! Persistent repository state
//!
//! This module contains the building blocks of a repository on disk:
//!
//! - `database`: content-addressed store for blobs and commits
//! - `refs`: branch pointers and HEAD
//! - `staging`: files staged for addition or removal in the next commit
//! - `workspace`: the working directory
//! - `repository`: the handle that owns one of each

pub mod database;
pub mod refs;
pub mod repository;
pub mod staging;
pub mod workspace;
