//! Statement execution against the target database
//!
//! The executor treats changescript text as opaque: it is handed to SQLite as a
//! batch and either runs to completion or fails. A watchdog bounds how long a
//! single changescript may run by interrupting the connection.

use crate::areas::database::Database;
use crate::artifacts::core::error::ExecutionError;
use rusqlite::{Connection, ErrorCode};
use std::sync::mpsc;
use std::time::Duration;
use tracing::warn;

/// Runs raw statement text against a database
pub trait StatementExecutor {
    fn execute(&self, statement: &str, timeout: Option<Duration>) -> Result<(), ExecutionError>;
}

#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    database: Database,
}

impl SqliteExecutor {
    pub fn new(database: Database) -> Self {
        SqliteExecutor { database }
    }

    fn execute_with_watchdog(
        conn: &Connection,
        statement: &str,
        timeout: Duration,
    ) -> rusqlite::Result<()> {
        let interrupt = conn.get_interrupt_handle();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let watchdog = std::thread::spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) = done_rx.recv_timeout(timeout) {
                interrupt.interrupt();
            }
        });

        let result = conn.execute_batch(statement);

        // the watchdog must be gone before the connection runs anything else
        let _ = done_tx.send(());
        if watchdog.join().is_err() {
            warn!("statement watchdog panicked");
        }

        result
    }

    /// Undo a transaction a failed script opened with `BEGIN` and never closed
    ///
    /// The ledger writes that follow share this connection and must not land
    /// inside the script's transaction.
    fn rollback_open_transaction(conn: &Connection) -> rusqlite::Result<()> {
        if !conn.is_autocommit() {
            warn!("rolling back transaction left open by a failed changescript");
            conn.execute_batch("ROLLBACK")?;
        }

        Ok(())
    }
}

impl StatementExecutor for SqliteExecutor {
    fn execute(&self, statement: &str, timeout: Option<Duration>) -> Result<(), ExecutionError> {
        let outcome = self.database.with_connection(|conn| {
            let result = match timeout {
                Some(timeout) => Self::execute_with_watchdog(conn, statement, timeout),
                None => conn.execute_batch(statement),
            };

            if result.is_err() {
                Self::rollback_open_transaction(conn)?;
            }

            Ok(result)
        });

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(rusqlite::Error::SqliteFailure(err, _)))
                if err.code == ErrorCode::OperationInterrupted =>
            {
                Err(ExecutionError::Timeout(timeout.unwrap_or_default()))
            }
            Ok(Err(err)) => Err(ExecutionError::Failure(err.to_string())),
            Err(err) => Err(ExecutionError::Failure(err.to_string())),
        }
    }
}
