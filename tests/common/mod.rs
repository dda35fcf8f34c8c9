#![allow(dead_code)]

pub mod command;
pub mod file;

use rusqlite::{Connection, OpenFlags};
use std::path::Path;

pub const DATABASE: &str = "database.sqlite";
pub const SCRIPTS_DIR: &str = "changescripts";

/// Open the test database read-only to inspect what the binary did
pub fn inspect_database(dir: &Path) -> Connection {
    Connection::open_with_flags(dir.join(DATABASE), OpenFlags::SQLITE_OPEN_READ_ONLY)
        .expect("Failed to open test database")
}

pub fn applied_versions(dir: &Path) -> Vec<String> {
    let conn = inspect_database(dir);
    let mut stmt = conn
        .prepare("SELECT version FROM swoosh_db_versioning_history ORDER BY rowid")
        .expect("Failed to query ledger history");
    stmt.query_map([], |row| row.get(0))
        .expect("Failed to read ledger history")
        .collect::<Result<Vec<String>, _>>()
        .expect("Failed to read ledger row")
}

pub fn meta_value(dir: &Path, key: &str) -> Option<String> {
    inspect_database(dir)
        .query_row(
            "SELECT value FROM swoosh_db_versioning_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .expect("Failed to read ledger meta")
}

pub fn table_exists(dir: &Path, table: &str) -> bool {
    inspect_database(dir)
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [table],
            |row| row.get(0),
        )
        .expect("Failed to query sqlite_master")
}
