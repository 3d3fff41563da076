//! Branch pointers and HEAD
//!
//! ## File Format
//!
//! - `branches/<name>`: the 40-character id of the branch tip
//! - `HEAD`: the name of the checked-out branch (always symbolic)
//! - `HEAD_COMMIT`, `MAIN_COMMIT`: cached tips of the current branch and of
//!   `main`, rewritten whenever either pointer moves
//!
//! Branch names may contain slashes, in which case the branch file lives in
//! nested directories under `branches/`.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Name of the file holding the current branch name
pub const HEAD_REF_NAME: &str = "HEAD";
const HEAD_COMMIT_CACHE: &str = "HEAD_COMMIT";
const MAIN_COMMIT_CACHE: &str = "MAIN_COMMIT";
const BRANCHES_DIR: &str = "branches";

/// Reference manager
///
/// Ref files are written under an exclusive `file-guard` lock.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (typically `.sprout`)
    path: Box<Path>,
}

impl Refs {
    /// Create a new branch pointing at `oid`
    ///
    /// Fails with `AlreadyExists` if the name is taken.
    pub fn create_branch(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(RepositoryError::AlreadyExists {
                name: name.to_string(),
            }
            .into());
        }

        self.update_branch(name, oid)
    }

    /// Move `name` to `oid`, creating it if needed, and refresh the caches
    pub fn update_branch(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(self.branch_path(name), oid.as_ref())?;

        if name.is_default_branch() {
            self.update_ref_file(self.main_commit_path(), oid.as_ref())?;
        }
        if self.current_branch_name()?.as_deref() == Some(name.as_ref()) {
            self.update_ref_file(self.head_commit_path(), oid.as_ref())?;
        }

        tracing::debug!(branch = %name, %oid, "updated branch");
        Ok(())
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        self.read_ref_file(&self.branch_path(name))
    }

    /// Delete a branch and return the commit it pointed at
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.branch_path(name);

        let oid = self
            .read_ref_file(&branch_path)?
            .ok_or_else(|| RepositoryError::NoSuchBranch {
                name: name.to_string(),
            })?;

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        if name.is_default_branch() {
            let main_commit_path = self.main_commit_path();
            if main_commit_path.exists() {
                std::fs::remove_file(&main_commit_path).with_context(|| {
                    format!("failed to delete main cache at {:?}", main_commit_path)
                })?;
            }
        }

        tracing::debug!(branch = %name, %oid, "deleted branch");
        Ok(oid)
    }

    /// All branch names, sorted
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let branches_path = self.branches_path();

        let mut branches = WalkDir::new(&branches_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&branches_path).ok()?;
                BranchName::try_parse(relative_path.to_string_lossy().to_string()).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    /// Point HEAD at a branch and cache the branch tip
    pub fn set_head(&self, name: &BranchName) -> anyhow::Result<()> {
        let oid = self
            .read_branch(name)?
            .ok_or_else(|| RepositoryError::NoSuchBranch {
                name: name.to_string(),
            })?;

        self.update_ref_file(self.head_path(), name.as_ref())?;
        self.update_ref_file(self.head_commit_path(), oid.as_ref())?;

        tracing::debug!(branch = %name, "switched HEAD");
        Ok(())
    }

    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        let name = self
            .current_branch_name()?
            .context("HEAD does not name a branch")?;

        BranchName::try_parse(name)
    }

    pub fn is_current_branch(&self, name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.current_branch()? == name)
    }

    /// Tip of the current branch
    pub fn read_head(&self) -> anyhow::Result<ObjectId> {
        if let Some(oid) = self.read_ref_file(&self.head_commit_path())? {
            return Ok(oid);
        }

        let current = self.current_branch()?;
        self.read_branch(&current)?
            .with_context(|| format!("branch {} has no commit", current))
    }

    /// Tip of `main`, if it still exists
    pub fn read_main(&self) -> anyhow::Result<Option<ObjectId>> {
        match self.read_ref_file(&self.main_commit_path())? {
            Some(oid) => Ok(Some(oid)),
            None => self.read_branch(&BranchName::default_branch()),
        }
    }

    fn current_branch_name(&self) -> anyhow::Result<Option<String>> {
        let head_path = self.head_path();
        if !head_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;
        let content = content.trim();

        Ok((!content.is_empty()).then(|| content.to_string()))
    }

    fn update_ref_file(&self, path: Box<Path>, raw_ref: &str) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn read_ref_file(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ObjectId::try_parse(content.to_string())?))
        }
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.branches_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.branches_path().join(name.as_ref()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn branches_path(&self) -> Box<Path> {
        self.path.join(BRANCHES_DIR).into_boxed_path()
    }

    fn head_commit_path(&self) -> Box<Path> {
        self.path.join(HEAD_COMMIT_CACHE).into_boxed_path()
    }

    fn main_commit_path(&self) -> Box<Path> {
        self.path.join(MAIN_COMMIT_CACHE).into_boxed_path()
    }
}
