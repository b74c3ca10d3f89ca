//! Shared helpers for loading the project, its migrations and the database.

use anyhow::{Context, Result};
use lf_db::{Database, DuckDbBackend};
use lf_migrate::{load_migrations, Config, Migrator, SqlMigration};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and the database is closed cleanly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs exits with the code and prints nothing.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded project: its root directory and effective configuration.
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

impl Project {
    /// Migrations from the configured directories, in application order
    pub(crate) fn migrations(&self) -> Result<Vec<SqlMigration>> {
        load_migrations(&self.config.migration_paths_absolute(&self.root))
            .context("Failed to load migrations")
    }

    /// Open the configured DuckDB database, creating the file if needed
    pub(crate) fn open_database(&self) -> Result<DuckDbBackend> {
        let path = self.config.database_path(&self.root);
        let db = DuckDbBackend::new(&path).context("Failed to connect to database")?;
        log::debug!("Opened {} database {}", db.db_type(), path);
        Ok(db)
    }

    /// Whether opening the database would reuse existing state.
    ///
    /// False for a file path that is not on disk yet.
    pub(crate) fn database_exists(&self) -> bool {
        let path = self.config.database_path(&self.root);
        path == ":memory:" || Path::new(&path).exists()
    }

    pub(crate) fn migrator(&self) -> Migrator {
        Migrator::from_config(self.config.migrator_config())
    }
}

/// Load the project config and apply command-line overrides.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = global.project_dir.clone();
    let mut config = match &global.config {
        Some(path) => Config::load(path),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project config")?;

    if let Some(database) = &global.database {
        config.database.path = database.clone();
    }
    if let Some(table) = &global.table {
        config.ledger.table = table.clone();
    }
    config.validate().context("Invalid command-line override")?;

    Ok(Project { root, config })
}
