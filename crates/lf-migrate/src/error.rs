//! Error types for the migration runner.

use lf_db::DbError;
use thiserror::Error;

/// Migration runner errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Ledger table name is not a plain SQL identifier (L001).
    #[error("[L001] Invalid ledger table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    /// Catalog lookup for the ledger table failed (L002).
    #[error("[L002] Could not check whether ledger table '{table}' exists: {reason}")]
    CatalogCheck { table: String, reason: String },

    /// Ledger table could not be created (L003).
    #[error("[L003] Failed to create ledger table '{table}'")]
    LedgerCreate {
        table: String,
        #[source]
        source: DbError,
    },

    /// Applied names could not be read from the ledger (L004).
    #[error("[L004] Failed to load applied migrations from '{table}'")]
    LedgerRead {
        table: String,
        #[source]
        source: DbError,
    },

    /// Two migration files resolve to the same name (L005).
    #[error("[L005] Duplicate migration name '{name}' in {path1} and {path2}")]
    DuplicateMigration {
        name: String,
        path1: String,
        path2: String,
    },

    /// A migration file has no statement in it (L006).
    #[error("[L006] Migration file is empty: {path}")]
    EmptyMigration { path: String },

    /// Config file not found (L007).
    #[error("[L007] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value (L008).
    #[error("[L008] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// Config file could not be parsed (L009).
    #[error("[L009] Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// IO error with file path context (L010).
    #[error("[L010] IO error at {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
