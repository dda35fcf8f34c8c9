use crate::areas::repository::Repository;
use crate::artifacts::checkout::options::CheckoutOptions;
use crate::artifacts::checkout::report::DiagnosticsReport;
use anyhow::Context;

/// Token format of appended changescripts: UTC time down to the second
const TIMESTAMP_TOKEN_FORMAT: &str = "%Y%m%d%H%M%S";

impl Repository {
    /// Add a changescript after every existing one, then check out
    pub fn append(
        &self,
        statement: &str,
        options: CheckoutOptions,
    ) -> anyhow::Result<DiagnosticsReport> {
        if statement.trim().is_empty() {
            anyhow::bail!("refusing to append an empty changescript");
        }
        self.require_initialized()?;

        let token = chrono::Utc::now()
            .format(TIMESTAMP_TOKEN_FORMAT)
            .to_string()
            .parse::<u64>()
            .context("Failed to derive a changescript token from the clock")?;

        let script = self.scripts().write_next(token, statement)?;
        writeln!(
            self.writer(),
            "Created changescript {}",
            script.path().display()
        )?;

        self.checkout(options)
    }
}
