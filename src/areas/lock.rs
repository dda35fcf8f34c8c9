//! Checkout exclusion
//!
//! Two checkouts against one database must never interleave, or both could see
//! the same changescript as unapplied and run it twice. A `CheckoutLock` is held
//! for a whole run and combines:
//!
//! - a process-wide gate, serializing checkouts started from the same process
//! - an exclusive lock on a lock file, serializing checkouts across processes
//!
//! Acquisition blocks; a waiting run proceeds once the holder is done and then
//! sees the holder's ledger writes.

use crate::artifacts::core::error::{Result, VersioningError};
use file_guard::{FileGuard, Lock};
use std::fs::File;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

static CHECKOUT_GATE: Mutex<()> = Mutex::new(());

/// Held for the duration of one checkout, released on drop
pub struct CheckoutLock {
    // field order is drop order: the file lock goes before the process gate
    _file: Option<FileGuard<Box<File>>>,
    _gate: MutexGuard<'static, ()>,
}

impl CheckoutLock {
    pub fn acquire(lock_file: Option<&Path>) -> Result<Self> {
        let gate = CHECKOUT_GATE.lock().unwrap_or_else(PoisonError::into_inner);

        let file = match lock_file {
            Some(path) => Some(Self::lock_file(path)?),
            None => None,
        };

        debug!(lock_file = ?lock_file, "checkout lock acquired");
        Ok(CheckoutLock {
            _file: file,
            _gate: gate,
        })
    }

    fn lock_file(path: &Path) -> Result<FileGuard<Box<File>>> {
        let to_lock_error = |source| VersioningError::Lock {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(to_lock_error)?;
        }

        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(to_lock_error)?;

        file_guard::lock(Box::new(file), Lock::Exclusive, 0, 1).map_err(to_lock_error)
    }
}
