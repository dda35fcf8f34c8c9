use crate::artifacts::changescript::script_id::ScriptId;
use crate::artifacts::core::error::ExecutionError;
use chrono::{DateTime, Utc};
use colored::Colorize;
use derive_new::new;

const LABEL_WIDTH: usize = 4;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct AppliedScript {
    pub id: ScriptId,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FailedScript {
    pub id: ScriptId,
    pub error: ExecutionError,
}

/// Summary of one checkout run
///
/// Built by the engine while the run progresses and frozen once it returns.
/// A checkout that returns a report has "succeeded" even when changescripts
/// failed; `is_clean` is what callers should gate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsReport {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    fallback_version: ScriptId,
    current_version: ScriptId,
    applied: Vec<AppliedScript>,
    failed: Vec<FailedScript>,
    skipped: usize,
    not_attempted: Vec<ScriptId>,
}

impl DiagnosticsReport {
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Version the database was at when the run started
    pub fn fallback_version(&self) -> &ScriptId {
        &self.fallback_version
    }

    /// Version the database is at after the run
    pub fn current_version(&self) -> &ScriptId {
        &self.current_version
    }

    pub fn applied(&self) -> &[AppliedScript] {
        &self.applied
    }

    pub fn failed(&self) -> &[FailedScript] {
        &self.failed
    }

    /// Changescripts left out because the ledger already had them
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Changescripts left pending after an aborting failure
    pub fn not_attempted(&self) -> &[ScriptId] {
        &self.not_attempted
    }

    pub fn applied_ids(&self) -> Vec<&str> {
        self.applied.iter().map(|script| script.id.as_ref()).collect()
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|script| script.id.as_ref()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.failed.is_empty() && self.not_attempted.is_empty()
    }
}

/// Accumulates outcomes while a checkout is running
#[derive(Debug)]
pub(crate) struct ReportBuilder {
    started_at: DateTime<Utc>,
    fallback_version: ScriptId,
    applied: Vec<AppliedScript>,
    failed: Vec<FailedScript>,
    skipped: usize,
    not_attempted: Vec<ScriptId>,
}

impl ReportBuilder {
    pub(crate) fn new(started_at: DateTime<Utc>, fallback_version: ScriptId, skipped: usize) -> Self {
        ReportBuilder {
            started_at,
            fallback_version,
            applied: Vec::new(),
            failed: Vec::new(),
            skipped,
            not_attempted: Vec::new(),
        }
    }

    pub(crate) fn applied(&mut self, id: ScriptId, applied_at: DateTime<Utc>) {
        self.applied.push(AppliedScript::new(id, applied_at));
    }

    pub(crate) fn failed(&mut self, id: ScriptId, error: ExecutionError) {
        self.failed.push(FailedScript::new(id, error));
    }

    pub(crate) fn not_attempted(&mut self, ids: impl IntoIterator<Item = ScriptId>) {
        self.not_attempted.extend(ids);
    }

    pub(crate) fn finish(self, current_version: ScriptId) -> DiagnosticsReport {
        DiagnosticsReport {
            started_at: self.started_at,
            finished_at: Utc::now(),
            fallback_version: self.fallback_version,
            current_version,
            applied: self.applied,
            failed: self.failed,
            skipped: self.skipped,
            not_attempted: self.not_attempted,
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

impl std::fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Checkout started {} at version {}",
            self.started_at.format(TIMESTAMP_FORMAT),
            self.fallback_version
        )?;

        if self.is_noop() {
            writeln!(f, "Already up to date ({} skipped)", self.skipped)?;
        } else {
            if !self.applied.is_empty() {
                writeln!(
                    f,
                    "Applied {} changescript{}:",
                    self.applied.len(),
                    plural(self.applied.len())
                )?;
                for script in &self.applied {
                    writeln!(
                        f,
                        "{:>width$}{}  {}",
                        "",
                        script.id.to_string().green(),
                        script.applied_at.format(TIMESTAMP_FORMAT),
                        width = LABEL_WIDTH
                    )?;
                }
            }

            if !self.failed.is_empty() {
                writeln!(
                    f,
                    "Failed {} changescript{}:",
                    self.failed.len(),
                    plural(self.failed.len())
                )?;
                for script in &self.failed {
                    writeln!(
                        f,
                        "{:>width$}{}  {}",
                        "",
                        script.id.to_string().red(),
                        script.error,
                        width = LABEL_WIDTH
                    )?;
                }
            }

            if !self.not_attempted.is_empty() {
                writeln!(f, "Not attempted after failure:")?;
                for id in &self.not_attempted {
                    writeln!(f, "{:>width$}{}", "", id.to_string().yellow(), width = LABEL_WIDTH)?;
                }
            }

            writeln!(
                f,
                "Skipped {} already applied changescript{}",
                self.skipped,
                plural(self.skipped)
            )?;
        }

        write!(f, "Current version: {}", self.current_version)
    }
}
