//! Ledger records
//!
//! - `ledger_entry`: one successful application of a changescript
//! - `versioning_state`: the three named version pointers kept beside the entries

pub mod ledger_entry;
pub mod versioning_state;
