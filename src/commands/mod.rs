//! Command implementations
//!
//! Commands are methods on `Repository`, split the way the CLI presents them:
//!
//! - `plumbing`: direct reads of the ledger and the script store (version, show)
//! - `porcelain`: operator workflows (init, checkout, status, history, append)

pub mod plumbing;
pub mod porcelain;
