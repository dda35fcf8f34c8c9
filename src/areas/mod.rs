//! Storage components of a versioned database
//!
//! - `changescripts`: the directory of changescripts (read-only source)
//! - `database`: shared handle to the target SQLite database
//! - `executor`: runs changescript text against the database
//! - `ledger`: applied changescripts and version pointers
//! - `lock`: exclusion between concurrent checkouts
//! - `repository`: ties the above together for the commands

pub mod changescripts;
pub mod database;
pub mod executor;
pub mod ledger;
pub mod lock;
pub mod repository;
