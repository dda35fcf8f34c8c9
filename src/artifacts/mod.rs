//! Versioning data structures and algorithms
//!
//! - `changescript`: changescript identity and ordering
//! - `checkout`: the checkout engine, its options and its report
//! - `core`: shared utilities (errors, pager wrapper)
//! - `ledger`: ledger entries and version pointers

pub mod changescript;
pub mod checkout;
pub mod core;
pub mod ledger;
