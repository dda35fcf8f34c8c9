//! Error kinds of the versioning core
//!
//! `VersioningError` covers everything that aborts a whole operation.
//! `ExecutionError` is the outcome of one changescript and never aborts a
//! checkout on its own; it travels inside the diagnostics report instead.

use crate::artifacts::changescript::script_id::ScriptId;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum VersioningError {
    #[error("changescript store at {path:?} is unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("changescript {0} not found")]
    NotFound(ScriptId),

    #[error("invalid changescript name: {0:?}")]
    InvalidScriptName(String),

    #[error("changescripts {first} and {second} share the ordering key {key}")]
    AmbiguousOrder {
        key: u64,
        first: ScriptId,
        second: ScriptId,
    },

    #[error("changescript {0} is already recorded as applied")]
    DuplicateApplication(ScriptId),

    #[error("versioning ledger is not initialized (missing table {0})")]
    LedgerUninitialized(&'static str),

    #[error("invalid version pointer {key}={value:?}")]
    CorruptPointer { key: &'static str, value: String },

    #[error("failed to acquire checkout lock at {path:?}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

/// Why a single changescript did not apply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("execution failed: {0}")]
    Failure(String),

    #[error("execution timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, VersioningError>;
