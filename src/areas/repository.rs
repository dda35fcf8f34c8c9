use crate::areas::changescripts::ScriptDirectory;
use crate::areas::database::Database;
use crate::areas::executor::SqliteExecutor;
use crate::areas::ledger::SqliteLedger;
use crate::artifacts::checkout::engine::CheckoutEngine;
use crate::artifacts::checkout::options::CheckoutOptions;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Extension appended to the database path to name the checkout lock file
const LOCK_FILE_SUFFIX: &str = "lock";

pub type SqliteCheckoutEngine = CheckoutEngine<ScriptDirectory, SqliteLedger, SqliteExecutor>;

/// A target database together with its changescript directory
pub struct Repository {
    database_path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    scripts: ScriptDirectory,
    database: Database,
    ledger: SqliteLedger,
}

impl Repository {
    /// Open a repository whose database already exists
    pub fn open(
        database_path: &Path,
        scripts_path: &Path,
        writer: Box<dyn std::io::Write>,
    ) -> anyhow::Result<Self> {
        if !database_path.is_file() {
            anyhow::bail!(
                "database {} does not exist, run `dbver init` first",
                database_path.display()
            );
        }

        let database = Database::open_existing(database_path)
            .with_context(|| format!("failed to open database {}", database_path.display()))?;

        Self::assemble(database_path, scripts_path, writer, database)
    }

    /// Open a repository, creating the database file if it is missing
    pub fn create(
        database_path: &Path,
        scripts_path: &Path,
        writer: Box<dyn std::io::Write>,
    ) -> anyhow::Result<Self> {
        if let Some(parent) = database_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create parent directories for {}", database_path.display())
            })?;
        }

        let database = Database::open(database_path)
            .with_context(|| format!("failed to create database {}", database_path.display()))?;

        Self::assemble(database_path, scripts_path, writer, database)
    }

    fn assemble(
        database_path: &Path,
        scripts_path: &Path,
        writer: Box<dyn std::io::Write>,
        database: Database,
    ) -> anyhow::Result<Self> {
        let database_path = std::path::absolute(database_path)?;
        let scripts_path = std::path::absolute(scripts_path)?;

        Ok(Repository {
            database_path: database_path.into_boxed_path(),
            writer: RefCell::new(writer),
            scripts: ScriptDirectory::new(scripts_path.into_boxed_path()),
            ledger: SqliteLedger::new(database.clone()),
            database,
        })
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn lock_path(&self) -> PathBuf {
        let mut file_name = self.database_path.as_os_str().to_owned();
        file_name.push(".");
        file_name.push(LOCK_FILE_SUFFIX);
        PathBuf::from(file_name)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn scripts(&self) -> &ScriptDirectory {
        &self.scripts
    }

    pub fn ledger(&self) -> &SqliteLedger {
        &self.ledger
    }

    /// Build a checkout engine over this repository's stores
    ///
    /// The repository's lock file is used unless `options` names another one.
    pub fn engine(&self, mut options: CheckoutOptions) -> SqliteCheckoutEngine {
        if options.lock_file.is_none() {
            options.lock_file = Some(self.lock_path());
        }

        CheckoutEngine::new(
            self.scripts.clone(),
            self.ledger.clone(),
            SqliteExecutor::new(self.database.clone()),
            options,
        )
    }

    pub(crate) fn require_initialized(&self) -> anyhow::Result<()> {
        if !self.ledger.is_initialized()? {
            anyhow::bail!(
                "database {} has no versioning ledger, run `dbver init` first",
                self.database_path.display()
            );
        }

        Ok(())
    }
}
