use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use crate::errors::RepositoryError;

impl Repository {
    /// Stage the working copy of `file_name` for the next commit
    ///
    /// A file that is gone from the working directory but staged for removal
    /// is brought back from its tombstone instead.
    pub fn add(&mut self, file_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        Workspace::validate_file_name(file_name)?;
        let (_, head) = self.head_commit()?;
        let mut staging = self.staging();

        match self.workspace().try_read_file(file_name)? {
            Some(content) => {
                let restored =
                    staging.stage(self.database(), file_name, content, head.tree())?;
                if let Some(restored) = restored {
                    self.workspace().write_file(file_name, &restored)?;
                }
            }
            None => {
                let restored = staging.restore_removed(file_name).ok_or_else(|| {
                    RepositoryError::FileNotFound {
                        file_name: file_name.to_string(),
                    }
                })?;
                self.workspace().write_file(file_name, &restored)?;
            }
        }

        staging.write_updates()?;
        tracing::debug!(file = file_name, "staged file");

        Ok(())
    }
}
