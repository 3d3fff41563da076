use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::StatusInfo;
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub fn show_status(&self) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        let status = self.status().initialize()?;

        self.print_branches(&status)?;
        self.print_section("Staged Files", status.staged_files.iter().cloned())?;
        self.print_section("Removed Files", status.removed_files.iter().cloned())?;
        self.print_section(
            "Modifications Not Staged For Commit",
            status
                .unstaged_changes
                .iter()
                .map(|(file_name, change)| format!("{} {}", file_name, change)),
        )?;
        self.print_section(
            "Untracked Files",
            status
                .untracked_files
                .iter()
                .map(|file_name| file_name.red().to_string()),
        )?;

        Ok(())
    }

    fn print_branches(&self, status: &StatusInfo) -> anyhow::Result<()> {
        self.print_section(
            "Branches",
            status.branches.iter().map(|branch| {
                if branch == &status.current_branch {
                    format!("*{}", branch.as_ref().green())
                } else {
                    branch.to_string()
                }
            }),
        )
    }

    fn print_section(
        &self,
        title: &str,
        lines: impl Iterator<Item = String>,
    ) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "=== {} ===", title)?;
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
