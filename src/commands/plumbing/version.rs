use crate::areas::ledger::VersionLedger;
use crate::areas::repository::Repository;
use crate::artifacts::ledger::versioning_state::MetaKey;

const UNSET: &str = "unset";

impl Repository {
    pub fn version(&self, all: bool) -> anyhow::Result<()> {
        self.require_initialized()?;

        if !all {
            writeln!(self.writer(), "{}", self.ledger().current_version()?)?;
            return Ok(());
        }

        let state = self.ledger().state()?;
        let pointers = [
            (MetaKey::CurrentVersion, Some(state.current_version)),
            (MetaKey::FallbackVersion, state.fallback_version),
            (MetaKey::LastExceptionVersion, state.last_exception_version),
        ];

        for (key, value) in pointers {
            writeln!(
                self.writer(),
                "{}: {}",
                key,
                value.as_ref().map_or(UNSET, |id| id.as_ref())
            )?;
        }

        Ok(())
    }
}
