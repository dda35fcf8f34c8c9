//! Version ledger
//!
//! The ledger is the durable answer to "which changescripts ran here". It has
//! two parts that must never disagree:
//!
//! - the history table: one row per applied changescript, append-only
//! - the meta table: the `current_version`, `fallback_version` and
//!   `last_exception_version` pointers
//!
//! ## Schema
//!
//! ```sql
//! swoosh_db_versioning_history (version TEXT PRIMARY KEY, applied_at INTEGER NOT NULL)
//! swoosh_db_versioning_meta    (key TEXT PRIMARY KEY, value TEXT)
//! ```
//!
//! `applied_at` holds Unix seconds. A failed changescript never gets a history
//! row, it only moves `last_exception_version`.

use crate::areas::database::Database;
use crate::artifacts::changescript::script_id::{BASELINE_VERSION, ScriptId};
use crate::artifacts::core::error::{Result, VersioningError};
use crate::artifacts::ledger::ledger_entry::LedgerEntry;
use crate::artifacts::ledger::versioning_state::{MetaKey, VersioningState};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::collections::BTreeSet;
use tracing::debug;

pub const HISTORY_TABLE: &str = "swoosh_db_versioning_history";
pub const META_TABLE: &str = "swoosh_db_versioning_meta";

/// Durable record of applied changescripts and the version pointers
pub trait VersionLedger {
    /// Identifiers with a recorded successful application
    fn applied_ids(&self) -> Result<BTreeSet<ScriptId>>;

    /// Every history entry, oldest first
    fn entries(&self) -> Result<Vec<LedgerEntry>>;

    fn current_version(&self) -> Result<ScriptId>;

    fn set_current_version(&self, id: &ScriptId) -> Result<()>;

    fn fallback_version(&self) -> Result<Option<ScriptId>>;

    fn set_fallback_version(&self, id: &ScriptId) -> Result<()>;

    fn last_exception_version(&self) -> Result<Option<ScriptId>>;

    /// Append a history entry; visible to the next `applied_ids` call
    fn record_success(&self, entry: &LedgerEntry) -> Result<()>;

    /// Point `last_exception_version` at `id` without touching the history
    fn record_failure(&self, id: &ScriptId) -> Result<()>;

    /// Append a history entry and move `current_version` as one unit
    fn record_applied(&self, entry: &LedgerEntry, current_version: &ScriptId) -> Result<()> {
        self.record_success(entry)?;
        self.set_current_version(current_version)
    }

    fn state(&self) -> Result<VersioningState> {
        Ok(VersioningState {
            current_version: self.current_version()?,
            fallback_version: self.fallback_version()?,
            last_exception_version: self.last_exception_version()?,
        })
    }
}

/// Ledger stored in the target SQLite database itself
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    database: Database,
}

impl SqliteLedger {
    pub fn new(database: Database) -> Self {
        SqliteLedger { database }
    }

    /// Create the ledger tables and seed the pointers with the baseline
    ///
    /// Safe to run against an already initialized database: existing rows and
    /// pointers are left as they are.
    pub fn initialize(&self) -> Result<()> {
        self.database.with_connection(|conn| {
            let tx = conn.transaction()?;
            tx.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {HISTORY_TABLE} (
                    version TEXT PRIMARY KEY,
                    applied_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS {META_TABLE} (
                    key TEXT PRIMARY KEY,
                    value TEXT
                );"
            ))?;

            let seeds = [
                (MetaKey::CurrentVersion, Some(BASELINE_VERSION)),
                (MetaKey::FallbackVersion, Some(BASELINE_VERSION)),
                (MetaKey::LastExceptionVersion, None),
            ];
            for (key, value) in seeds {
                tx.execute(
                    &format!("INSERT OR IGNORE INTO {META_TABLE} (key, value) VALUES (?1, ?2)"),
                    params![key.as_str(), value],
                )?;
            }

            tx.commit()?;
            debug!("versioning ledger initialized");
            Ok(())
        })
    }

    pub fn is_initialized(&self) -> Result<bool> {
        self.database
            .with_connection(|conn| Ok(Self::missing_table(conn)?.is_none()))
    }

    fn missing_table(conn: &Connection) -> Result<Option<&'static str>> {
        for table in [HISTORY_TABLE, META_TABLE] {
            let exists: bool = conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                params![table],
                |row| row.get(0),
            )?;
            if !exists {
                return Ok(Some(table));
            }
        }

        Ok(None)
    }

    fn require_tables(conn: &Connection) -> Result<()> {
        match Self::missing_table(conn)? {
            Some(table) => Err(VersioningError::LedgerUninitialized(table)),
            None => Ok(()),
        }
    }

    fn read_pointer(&self, key: MetaKey) -> Result<Option<ScriptId>> {
        self.database.with_connection(|conn| {
            Self::require_tables(conn)?;

            let value: Option<String> = conn
                .query_row(
                    &format!("SELECT value FROM {META_TABLE} WHERE key = ?1"),
                    params![key.as_str()],
                    |row| row.get(0),
                )
                .optional()?
                .flatten();

            value
                .map(|value| {
                    ScriptId::try_parse(&value).map_err(|_| VersioningError::CorruptPointer {
                        key: key.as_str(),
                        value,
                    })
                })
                .transpose()
        })
    }

    fn upsert_pointer(conn: &Connection, key: MetaKey, id: &ScriptId) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO {META_TABLE} (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value"
            ),
            params![key.as_str(), id.as_ref()],
        )?;

        Ok(())
    }

    fn write_pointer(&self, key: MetaKey, id: &ScriptId) -> Result<()> {
        self.database.with_connection(|conn| {
            Self::require_tables(conn)?;
            Self::upsert_pointer(conn, key, id)
        })
    }

    fn insert_entry(conn: &Connection, entry: &LedgerEntry) -> Result<()> {
        let inserted = conn.execute(
            &format!("INSERT INTO {HISTORY_TABLE} (version, applied_at) VALUES (?1, ?2)"),
            params![entry.id().as_ref(), entry.applied_at().timestamp()],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(VersioningError::DuplicateApplication(entry.id().clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl VersionLedger for SqliteLedger {
    fn applied_ids(&self) -> Result<BTreeSet<ScriptId>> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|entry| entry.id().clone())
            .collect())
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>> {
        self.database.with_connection(|conn| {
            Self::require_tables(conn)?;

            let mut stmt = conn.prepare(&format!(
                "SELECT version, applied_at FROM {HISTORY_TABLE} ORDER BY applied_at, rowid"
            ))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(version, applied_at)| {
                    let id = ScriptId::try_parse(&version)?;
                    let applied_at = DateTime::<Utc>::from_timestamp(applied_at, 0).unwrap_or_default();
                    Ok(LedgerEntry::new(id, applied_at))
                })
                .collect()
        })
    }

    fn current_version(&self) -> Result<ScriptId> {
        Ok(self
            .read_pointer(MetaKey::CurrentVersion)?
            .unwrap_or_else(ScriptId::baseline))
    }

    fn set_current_version(&self, id: &ScriptId) -> Result<()> {
        self.write_pointer(MetaKey::CurrentVersion, id)
    }

    fn fallback_version(&self) -> Result<Option<ScriptId>> {
        self.read_pointer(MetaKey::FallbackVersion)
    }

    fn set_fallback_version(&self, id: &ScriptId) -> Result<()> {
        self.write_pointer(MetaKey::FallbackVersion, id)
    }

    fn last_exception_version(&self) -> Result<Option<ScriptId>> {
        self.read_pointer(MetaKey::LastExceptionVersion)
    }

    fn record_success(&self, entry: &LedgerEntry) -> Result<()> {
        self.database.with_connection(|conn| {
            Self::require_tables(conn)?;
            Self::insert_entry(conn, entry)
        })
    }

    fn record_failure(&self, id: &ScriptId) -> Result<()> {
        self.write_pointer(MetaKey::LastExceptionVersion, id)
    }

    fn record_applied(&self, entry: &LedgerEntry, current_version: &ScriptId) -> Result<()> {
        self.database.with_connection(|conn| {
            Self::require_tables(conn)?;

            let tx = conn.transaction()?;
            Self::insert_entry(&tx, entry)?;
            Self::upsert_pointer(&tx, MetaKey::CurrentVersion, current_version)?;
            tx.commit()?;

            Ok(())
        })
    }
}
