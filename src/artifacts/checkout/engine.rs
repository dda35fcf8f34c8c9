//! Checkout engine
//!
//! One checkout brings the ledger up to date with the changescript source:
//!
//! 1. Capture `current_version` so it can be stored as `fallback_version`
//! 2. List the source and read the applied identifiers from the ledger
//! 3. Keep the scripts the ledger does not know about, ascending by key, and
//!    read the statement text of each
//! 4. Run them one by one; a success appends to the ledger and advances
//!    `current_version`, a failure moves `last_exception_version`
//!
//! Nothing is written before every pending script has been read, so an
//! unreadable source leaves the ledger exactly as it was. The whole run happens under a
//! `CheckoutLock`.

use crate::areas::changescripts::ChangescriptSource;
use crate::areas::executor::StatementExecutor;
use crate::areas::ledger::VersionLedger;
use crate::areas::lock::CheckoutLock;
use crate::artifacts::changescript::changescript::Changescript;
use crate::artifacts::changescript::script_id::ScriptId;
use crate::artifacts::checkout::options::{CheckoutOptions, FailurePolicy};
use crate::artifacts::checkout::report::{DiagnosticsReport, ReportBuilder};
use crate::artifacts::core::error::{Result, VersioningError};
use crate::artifacts::ledger::ledger_entry::LedgerEntry;
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Work list of a checkout, computed without touching anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pending: Vec<Changescript>,
    skipped: usize,
}

impl CheckoutPlan {
    /// Keep the scripts missing from `applied`, in ascending key order
    pub fn compute(mut scripts: Vec<Changescript>, applied: &BTreeSet<ScriptId>) -> Self {
        scripts.sort();

        let total = scripts.len();
        let pending = scripts
            .into_iter()
            .filter(|script| !applied.contains(script.id()))
            .collect::<Vec<_>>();

        CheckoutPlan {
            skipped: total - pending.len(),
            pending,
        }
    }

    pub fn pending(&self) -> &[Changescript] {
        &self.pending
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

pub struct CheckoutEngine<S, L, E> {
    source: S,
    ledger: L,
    executor: E,
    options: CheckoutOptions,
}

impl<S, L, E> CheckoutEngine<S, L, E>
where
    S: ChangescriptSource,
    L: VersionLedger,
    E: StatementExecutor,
{
    pub fn new(source: S, ledger: L, executor: E, options: CheckoutOptions) -> Self {
        CheckoutEngine {
            source,
            ledger,
            executor,
            options,
        }
    }

    pub fn current_version(&self) -> Result<ScriptId> {
        self.ledger.current_version()
    }

    /// Compute the work list of a checkout without running it
    pub fn plan(&self) -> Result<CheckoutPlan> {
        let scripts = self.source.list()?;
        let applied = self.ledger.applied_ids()?;

        Ok(CheckoutPlan::compute(scripts, &applied))
    }

    /// Run every pending changescript and report what happened
    ///
    /// # Errors
    ///
    /// Only run-level problems are errors: an unavailable source, an
    /// unreadable ledger, a lock that cannot be taken or an integrity breach.
    /// Failing changescripts are part of the returned report.
    pub fn checkout(&mut self) -> Result<DiagnosticsReport> {
        let _lock = CheckoutLock::acquire(self.options.lock_file.as_deref())?;
        let started_at = Utc::now();

        let fallback_version = self.ledger.current_version()?;
        let scripts = self.source.list()?;
        let applied = self.ledger.applied_ids()?;
        let plan = CheckoutPlan::compute(scripts, &applied);
        let statements = plan
            .pending
            .iter()
            .map(|script| self.source.content_of(script.id()))
            .collect::<Result<Vec<_>>>()?;

        self.ledger.set_fallback_version(&fallback_version)?;
        info!(
            fallback_version = %fallback_version,
            pending = plan.pending.len(),
            skipped = plan.skipped,
            "checkout started"
        );

        let mut report = ReportBuilder::new(started_at, fallback_version.clone(), plan.skipped);
        let mut current_version = fallback_version;
        let mut pending = plan.pending.into_iter().zip(statements);

        while let Some((script, statement)) = pending.next() {
            let id = script.id();
            if self.ledger.applied_ids()?.contains(id) {
                return Err(VersioningError::DuplicateApplication(id.clone()));
            }

            debug!(script = %id, bytes = statement.len(), "executing changescript");

            match self.executor.execute(&statement, self.options.script_timeout) {
                Ok(()) => {
                    let applied_at = Utc::now();
                    if id > &current_version {
                        current_version = id.clone();
                    }
                    self.ledger
                        .record_applied(&LedgerEntry::new(id.clone(), applied_at), &current_version)?;

                    info!(script = %id, "changescript applied");
                    report.applied(id.clone(), applied_at);
                }
                Err(error) => {
                    self.ledger.record_failure(id)?;

                    warn!(script = %id, %error, "changescript failed");
                    report.failed(id.clone(), error);

                    if self.options.failure_policy == FailurePolicy::Abort {
                        report.not_attempted(pending.by_ref().map(|(script, _)| script.id().clone()));
                        break;
                    }
                }
            }
        }

        let report = report.finish(current_version);
        info!(
            applied = report.applied().len(),
            failed = report.failed().len(),
            current_version = %report.current_version(),
            "checkout finished"
        );

        Ok(report)
    }
}
