use crate::areas::repository::Repository;
use crate::areas::staging::Removal;
use crate::areas::workspace::Workspace;

impl Repository {
    /// Unstage `file_name`, or stage its removal and delete it if HEAD tracks it
    pub fn rm(&mut self, file_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        Workspace::validate_file_name(file_name)?;
        let (_, head) = self.head_commit()?;
        let working_content = self.workspace().try_read_file(file_name)?;

        let mut staging = self.staging();
        let removal = staging.unstage_for_removal(file_name, head.tree(), working_content)?;
        if removal == Removal::Tombstoned {
            self.workspace().remove_file(file_name)?;
        }
        staging.write_updates()?;

        Ok(())
    }
}
