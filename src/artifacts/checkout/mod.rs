//! Checkout runs
//!
//! This module brings a database up to date with its changescripts:
//! - Computing the work list (scripts the ledger has not seen, by key)
//! - Executing it in order under an exclusive lock
//! - Recording each outcome in the ledger and in a diagnostics report
//!
//! A failing changescript does not end the run unless the `Abort` failure
//! policy is selected.

pub mod engine;
pub mod options;
pub mod report;
