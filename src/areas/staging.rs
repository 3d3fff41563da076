//! Staging area
//!
//! The mutable overlay between the last commit and the next one. It holds two
//! disjoint sets keyed by file name:
//!
//! - `to_add`: content to track in the next commit
//! - `to_remove`: names to drop from the next commit, each with a tombstone
//!   holding the working copy content captured when it was removed
//!
//! ## On-disk layout
//!
//! ```text
//! staging/add/<file name>      staged content
//! staging/remove/<file name>   tombstone content
//! ```
//!
//! The staging area is loaded with `rehydrate`,
//! mutated in memory, and persisted with `write_updates`.

use crate::areas::database::Database;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::tree::FileTree;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::collections::BTreeMap;
use std::path::Path;

const ADD_DIR: &str = "add";
const REMOVE_DIR: &str = "remove";

/// What `unstage_for_removal` did with the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The file was only staged for addition; the working copy stays
    Unstaged,
    /// The file is now staged for removal; the caller deletes the working copy
    Tombstoned,
}

#[derive(Debug, Clone)]
pub struct StagingArea {
    /// Path to the staging directory (typically `.sprout/staging`)
    path: Box<Path>,
    to_add: BTreeMap<String, Bytes>,
    to_remove: BTreeMap<String, Bytes>,
    /// Flag indicating if the sets changed since loading
    changed: bool,
}

impl StagingArea {
    pub fn new(path: Box<Path>) -> Self {
        StagingArea {
            path,
            to_add: BTreeMap::new(),
            to_remove: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load both sets from disk, replacing the in-memory state
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.to_add = Self::read_set(&self.path.join(ADD_DIR))?;
        self.to_remove = Self::read_set(&self.path.join(REMOVE_DIR))?;
        self.changed = false;

        Ok(())
    }

    /// Persist both sets if they changed since the last load or write
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        Self::write_set(&self.path.join(ADD_DIR), &self.to_add)?;
        Self::write_set(&self.path.join(REMOVE_DIR), &self.to_remove)?;
        self.changed = false;

        tracing::debug!(
            staged = self.to_add.len(),
            removed = self.to_remove.len(),
            "persisted staging area"
        );
        Ok(())
    }

    /// Stage `content` as the next version of `file_name`
    ///
    /// If the content is exactly what HEAD already tracks the file is
    /// unstaged instead, and a pending removal is cancelled; the tombstone
    /// content is returned so the caller can put it back in the working copy.
    /// Otherwise the blob is written through to the database right away.
    pub fn stage(
        &mut self,
        database: &Database,
        file_name: &str,
        content: Bytes,
        head_tree: &FileTree,
    ) -> anyhow::Result<Option<Bytes>> {
        let blob = Blob::new(file_name.to_string(), content);
        self.changed = true;

        if head_tree.blob_for(file_name) == Some(&blob.object_id()) {
            self.to_add.remove(file_name);
            return Ok(self.to_remove.remove(file_name));
        }

        database.store_blob(&blob)?;
        self.to_remove.remove(file_name);
        self.to_add.insert(file_name.to_string(), blob.into_content());

        Ok(None)
    }

    /// Cancel a pending removal and hand back the tombstone content
    pub fn restore_removed(&mut self, file_name: &str) -> Option<Bytes> {
        let content = self.to_remove.remove(file_name)?;
        self.changed = true;

        Some(content)
    }

    /// Stage `file_name` for removal
    ///
    /// Fails with `NothingToRemove` unless the file is staged for addition or
    /// tracked by HEAD.
    pub fn unstage_for_removal(
        &mut self,
        file_name: &str,
        head_tree: &FileTree,
        working_content: Option<Bytes>,
    ) -> anyhow::Result<Removal> {
        if self.to_add.remove(file_name).is_some() {
            self.changed = true;
            return Ok(Removal::Unstaged);
        }

        if !head_tree.contains(file_name) {
            return Err(RepositoryError::NothingToRemove {
                file_name: file_name.to_string(),
            }
            .into());
        }

        self.to_remove
            .insert(file_name.to_string(), working_content.unwrap_or_default());
        self.changed = true;

        Ok(Removal::Tombstoned)
    }

    /// Build the tree of the next commit on top of `head_tree`
    ///
    /// Fails with `NoChanges` when nothing is staged. The sets are left
    /// untouched; clearing them is up to the caller once the commit is stored.
    pub fn materialize_commit(
        &self,
        database: &Database,
        head_tree: &FileTree,
    ) -> anyhow::Result<FileTree> {
        if self.is_empty() {
            return Err(RepositoryError::NoChanges.into());
        }

        let mut tree = head_tree.clone();
        for (file_name, content) in &self.to_add {
            let blob = Blob::new(file_name.clone(), content.clone());
            let blob_id = database.store_blob(&blob)?;
            tree.insert(file_name, blob_id);
        }
        for file_name in self.to_remove.keys() {
            tree.remove(file_name);
        }

        Ok(tree)
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn is_staged(&self, file_name: &str) -> bool {
        self.to_add.contains_key(file_name)
    }

    pub fn is_removed(&self, file_name: &str) -> bool {
        self.to_remove.contains_key(file_name)
    }

    pub fn staged_content(&self, file_name: &str) -> Option<&Bytes> {
        self.to_add.get(file_name)
    }

    /// Names staged for addition, sorted
    pub fn staged_files(&self) -> impl Iterator<Item = &str> {
        self.to_add.keys().map(String::as_str)
    }

    /// Names staged for removal, sorted
    pub fn removed_files(&self) -> impl Iterator<Item = &str> {
        self.to_remove.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.changed = true;
        }
        self.to_add.clear();
        self.to_remove.clear();
    }

    fn read_set(dir: &Path) -> anyhow::Result<BTreeMap<String, Bytes>> {
        let mut set = BTreeMap::new();
        if !dir.is_dir() {
            return Ok(set);
        }

        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("failed to read staging directory at {:?}", dir))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let content = std::fs::read(entry.path())
                .with_context(|| format!("failed to read staged file at {:?}", entry.path()))?;
            set.insert(
                entry.file_name().to_string_lossy().to_string(),
                Bytes::from(content),
            );
        }

        Ok(set)
    }

    /// Replace `dir` with the content of `set`
    ///
    /// The set is written into a sibling temp directory first, so a failed
    /// write leaves the previous content of `dir` in place.
    fn write_set(dir: &Path, set: &BTreeMap<String, Bytes>) -> anyhow::Result<()> {
        let temp_dir = dir.with_file_name(Self::generate_temp_name());

        if let Err(err) = Self::fill_dir(&temp_dir, set) {
            let _ = std::fs::remove_dir_all(&temp_dir);
            return Err(err);
        }

        if dir.exists() {
            std::fs::remove_dir_all(dir)
                .with_context(|| format!("failed to reset staging directory at {:?}", dir))?;
        }
        std::fs::rename(&temp_dir, dir)
            .with_context(|| format!("failed to move staging directory into {:?}", dir))?;

        Ok(())
    }

    fn fill_dir(dir: &Path, set: &BTreeMap<String, Bytes>) -> anyhow::Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create staging directory at {:?}", dir))?;

        for (file_name, content) in set {
            std::fs::write(dir.join(file_name), content)
                .with_context(|| format!("failed to write staged file {}", file_name))?;
        }

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-staging-{}", rand::random::<u32>())
    }
}
