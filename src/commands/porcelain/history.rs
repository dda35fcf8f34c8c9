use crate::areas::ledger::VersionLedger;
use crate::areas::repository::Repository;

impl Repository {
    pub fn history(&self) -> anyhow::Result<()> {
        self.require_initialized()?;

        let entries = self.ledger().entries()?;
        if entries.is_empty() {
            writeln!(self.writer(), "No changescripts applied")?;
            return Ok(());
        }

        for entry in entries {
            writeln!(
                self.writer(),
                "{}  {}",
                entry.readable_timestamp(),
                entry.id()
            )?;
        }

        Ok(())
    }
}
