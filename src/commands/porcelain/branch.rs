use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepositoryError;

impl Repository {
    /// Create a branch at HEAD without switching to it
    pub fn branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        let branch_name = BranchName::try_parse(branch_name.to_string())?;

        let head_oid = self.refs().read_head()?;
        self.refs().create_branch(&branch_name, &head_oid)?;

        Ok(())
    }

    /// Delete a branch pointer; its commits stay in the database
    pub fn rm_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        let branch_name = BranchName::try_parse(branch_name.to_string())?;

        if !self.refs().branch_exists(&branch_name) {
            return Err(RepositoryError::NoSuchBranch {
                name: branch_name.to_string(),
            }
            .into());
        }
        if self.refs().is_current_branch(&branch_name)? {
            return Err(RepositoryError::CurrentBranchProtected {
                name: branch_name.to_string(),
            }
            .into());
        }

        self.refs().delete_branch(&branch_name)?;

        Ok(())
    }
}
