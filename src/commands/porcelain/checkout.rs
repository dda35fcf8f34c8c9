use crate::areas::repository::Repository;
use crate::artifacts::checkout::options::CheckoutOptions;
use crate::artifacts::checkout::report::DiagnosticsReport;

impl Repository {
    /// Run a checkout and print its report
    ///
    /// Returns the report so the caller can turn failed changescripts into a
    /// non-zero exit status.
    pub fn checkout(&self, options: CheckoutOptions) -> anyhow::Result<DiagnosticsReport> {
        self.require_initialized()?;

        let report = self.engine(options).checkout()?;
        writeln!(self.writer(), "{}", report)?;

        Ok(report)
    }
}
