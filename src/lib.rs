//! Changescript versioning for SQLite databases
//!
//! A directory of numbered `.sql` changescripts is checked out against a
//! database: every script the database's ledger has not recorded yet is run in
//! ascending order, and each outcome is recorded durably next to the data.
//!
//! - `areas`: the stores (script directory, ledger, executor, lock)
//! - `artifacts`: identifiers, ledger records, the checkout engine and report
//! - `commands`: operator commands on a `Repository`

pub mod areas;
pub mod artifacts;
pub mod commands;

pub use areas::changescripts::{ChangescriptSource, ScriptDirectory};
pub use areas::executor::StatementExecutor;
pub use areas::ledger::VersionLedger;
pub use areas::repository::Repository;
pub use artifacts::checkout::engine::{CheckoutEngine, CheckoutPlan};
pub use artifacts::checkout::options::{CheckoutOptions, FailurePolicy};
pub use artifacts::checkout::report::DiagnosticsReport;
pub use artifacts::core::error::{ExecutionError, VersioningError};
