use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.scripts().path()).with_context(|| {
            format!(
                "Failed to create changescript directory {}",
                self.scripts().path().display()
            )
        })?;

        self.ledger()
            .initialize()
            .context("Failed to create versioning tables")?;

        writeln!(
            self.writer(),
            "Initialized versioning ledger in {}",
            self.database_path().display()
        )?;

        Ok(())
    }
}
