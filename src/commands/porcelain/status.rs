use crate::areas::repository::Repository;
use crate::artifacts::checkout::options::CheckoutOptions;
use colored::Colorize;

impl Repository {
    pub fn status(&self) -> anyhow::Result<()> {
        self.require_initialized()?;

        let engine = self.engine(CheckoutOptions::default());
        let plan = engine.plan()?;

        writeln!(self.writer(), "Current version: {}", engine.current_version()?)?;

        if plan.is_empty() {
            writeln!(
                self.writer(),
                "Up to date, {} changescript(s) applied",
                plan.skipped()
            )?;
            return Ok(());
        }

        writeln!(
            self.writer(),
            "Pending changescripts ({}):",
            plan.pending().len()
        )?;
        for script in plan.pending() {
            writeln!(self.writer(), "    {}", script.id().to_string().yellow())?;
        }

        Ok(())
    }
}
