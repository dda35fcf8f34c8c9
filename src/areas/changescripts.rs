//! Changescript sources
//!
//! A source enumerates the changescripts that exist and hands out their
//! statement text. It is strictly read-only: authors add scripts by dropping
//! files into the store, the engine never writes there (appending a script goes
//! through `ScriptDirectory::write_next`, outside of any checkout).
//!
//! ## Directory layout
//!
//! Only top-level files named `<digits>.sql` count. Anything else (notes,
//! backups, nested directories) is ignored. Listing is sorted by the numeric
//! token, never by the file system's enumeration order.

use crate::artifacts::changescript::changescript::Changescript;
use crate::artifacts::changescript::script_id::ScriptId;
use crate::artifacts::core::error::{Result, VersioningError};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Read-only view over the available changescripts
pub trait ChangescriptSource {
    /// All changescripts, ascending by ordering key
    fn list(&self) -> Result<Vec<Changescript>>;

    /// Statement text of one changescript, verbatim
    fn content_of(&self, id: &ScriptId) -> Result<String>;
}

/// Changescripts kept as files in a single directory
#[derive(Debug, Clone)]
pub struct ScriptDirectory {
    path: Box<Path>,
}

impl ScriptDirectory {
    pub fn new(path: Box<Path>) -> Self {
        ScriptDirectory { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl ToString) -> VersioningError {
        VersioningError::SourceUnavailable {
            path: self.path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Write a new changescript whose key sorts after every existing one
    ///
    /// The preferred key is the caller's timestamp token; when a script with an
    /// equal or greater key already exists the key becomes `latest + 1` so the
    /// new script is always last.
    pub fn write_next(&self, preferred_key: u64, statement: &str) -> Result<Changescript> {
        let latest = self.list()?.last().map(|script| script.id().key());
        let key = match latest {
            Some(latest) if latest >= preferred_key => latest
                .checked_add(1)
                .ok_or_else(|| VersioningError::InvalidScriptName(format!("{latest}+1")))?,
            _ => preferred_key,
        };

        let id = ScriptId::from_key(key);
        let path = self.path.join(id.file_name());
        std::fs::write(&path, statement).map_err(|e| self.unavailable(e))?;

        Ok(Changescript::new(id, path))
    }
}

impl ChangescriptSource for ScriptDirectory {
    fn list(&self) -> Result<Vec<Changescript>> {
        if !self.path.is_dir() {
            return Err(self.unavailable("not a readable directory"));
        }

        let mut scripts = Vec::new();
        for entry in WalkDir::new(&self.path).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| self.unavailable(e))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if let Some(id) = ScriptId::try_from_file_name(&file_name)? {
                scripts.push(Changescript::new(id, entry.path().to_path_buf()));
            }
        }

        scripts.sort();

        // the token is the ordering key, two scripts with one key have no defined order
        if let Some(pair) = scripts
            .windows(2)
            .find(|pair| pair[0].id().key() == pair[1].id().key())
        {
            return Err(VersioningError::AmbiguousOrder {
                key: pair[0].id().key(),
                first: pair[0].id().clone(),
                second: pair[1].id().clone(),
            });
        }

        debug!(path = ?self.path, count = scripts.len(), "listed changescripts");
        Ok(scripts)
    }

    fn content_of(&self, id: &ScriptId) -> Result<String> {
        let script_path: PathBuf = self.path.join(id.file_name());
        if !script_path.is_file() {
            return Err(VersioningError::NotFound(id.clone()));
        }

        std::fs::read_to_string(&script_path).map_err(|e| self.unavailable(e))
    }
}
