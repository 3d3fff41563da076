use crate::REPOSITORY_DIR;
use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Component, Path};

const IGNORED_PATHS: [&str; 3] = [REPOSITORY_DIR, ".", ".."];

/// The working directory, seen as a flat set of named files
///
/// Only regular files directly under the root take part; subdirectories and
/// the repository directory are never listed.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the plain files at the top level, sorted
    pub fn list_files(&self) -> anyhow::Result<Vec<String>> {
        let mut files = std::fs::read_dir(&self.path)
            .with_context(|| format!("failed to list working directory {:?}", self.path))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_file()))
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|file_name| !Self::is_ignored(file_name))
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    /// Fails with `InvalidFileName` unless `file_name` names a single entry
    /// directly under the root (no separators, no `.` or `..`)
    pub fn validate_file_name(file_name: &str) -> anyhow::Result<()> {
        let mut components = Path::new(file_name).components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None)
                if name == file_name && !Self::is_ignored(file_name) =>
            {
                Ok(())
            }
            _ => Err(RepositoryError::InvalidFileName {
                file_name: file_name.to_string(),
            }
            .into()),
        }
    }

    fn is_ignored(file_name: &str) -> bool {
        IGNORED_PATHS.contains(&file_name)
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.path.join(file_name).is_file()
    }

    pub fn read_file(&self, file_name: &str) -> anyhow::Result<Bytes> {
        let content = std::fs::read(self.path.join(file_name))
            .with_context(|| format!("Failed to read file: {:?}", file_name))?;

        Ok(Bytes::from(content))
    }

    /// Content of `file_name`, or None if there is no such file
    pub fn try_read_file(&self, file_name: &str) -> anyhow::Result<Option<Bytes>> {
        if !self.exists(file_name) {
            return Ok(None);
        }

        self.read_file(file_name).map(Some)
    }

    pub fn write_file(&self, file_name: &str, content: &[u8]) -> anyhow::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path.join(file_name))
            .with_context(|| format!("Failed to open file: {:?}", file_name))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to file: {:?}", file_name))?;

        Ok(())
    }

    /// Delete `file_name`; a missing file is not an error
    pub fn remove_file(&self, file_name: &str) -> anyhow::Result<()> {
        let path = self.path.join(file_name);

        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {:?}", file_name))?;
        }

        Ok(())
    }

    // deletions first, then rewrites of tracked files, then new files
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for (file_name, _) in migration.actions_of(ActionType::Delete) {
            self.remove_file(file_name)?;
        }

        for action in [ActionType::Modify, ActionType::Add] {
            for (file_name, blob_id) in migration.actions_of(action) {
                let content = migration.load_blob_data(blob_id)?;
                self.write_file(file_name, &content)?;
            }
        }

        Ok(())
    }
}
