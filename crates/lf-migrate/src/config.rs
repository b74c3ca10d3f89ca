//! Configuration types and parsing for ledgerflow.yml

use crate::error::{MigrateError, MigrateResult};
use crate::ledger::{validate_table_name, DEFAULT_LEDGER_TABLE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration from ledgerflow.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Ledger table settings
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// How each migration's statement is wrapped when executed
    #[serde(default)]
    pub transaction: TransactionMode,

    /// Directories containing migration SQL files, applied in this order
    #[serde(default = "default_migration_paths")]
    pub migration_paths: Vec<String>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the DuckDB file, or ":memory:"
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Ledger table settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Name of the tracking table
    #[serde(default = "default_ledger_table")]
    pub table: String,

    /// What to do when the catalog lookup for the ledger table fails
    #[serde(default)]
    pub on_catalog_error: CatalogCheckPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            table: default_ledger_table(),
            on_catalog_error: CatalogCheckPolicy::default(),
        }
    }
}

/// Reaction to a failed ledger existence check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogCheckPolicy {
    /// Stop the run with [`MigrateError::CatalogCheck`]
    #[default]
    Abort,
    /// Log the failure and try `CREATE TABLE` anyway
    #[serde(alias = "create")]
    AttemptCreate,
}

/// Transaction wrapping for migration statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionMode {
    /// Execute statements as-is under auto-commit
    #[default]
    None,
    /// Wrap each migration in BEGIN/COMMIT and roll back on failure
    PerMigration,
}

/// Settings a [`Migrator`](crate::Migrator) runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    pub table: String,
    pub on_catalog_error: CatalogCheckPolicy,
    pub transaction: TransactionMode,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            table: default_ledger_table(),
            on_catalog_error: CatalogCheckPolicy::default(),
            transaction: TransactionMode::default(),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_ledger_table() -> String {
    DEFAULT_LEDGER_TABLE.to_string()
}

fn default_migration_paths() -> Vec<String> {
    vec!["migrations".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            ledger: LedgerConfig::default(),
            transaction: TransactionMode::default(),
            migration_paths: default_migration_paths(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> MigrateResult<Self> {
        if !path.exists() {
            return Err(MigrateError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for ledgerflow.yml or ledgerflow.yaml
    pub fn load_from_dir(dir: &Path) -> MigrateResult<Self> {
        let yml_path = dir.join("ledgerflow.yml");
        let yaml_path = dir.join("ledgerflow.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(MigrateError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> MigrateResult<()> {
        if self.migration_paths.is_empty() {
            return Err(MigrateError::ConfigInvalid {
                message: "At least one migration_paths entry must be specified".to_string(),
            });
        }

        if self.database.path.is_empty() {
            return Err(MigrateError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        validate_table_name(&self.ledger.table)
    }

    /// Migration directories resolved against the project root
    pub fn migration_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.migration_paths.iter().map(|p| root.join(p)).collect()
    }

    /// Database path resolved against the project root (":memory:" passes through)
    pub fn database_path(&self, root: &Path) -> String {
        if self.database.path == DEFAULT_DB_PATH || Path::new(&self.database.path).is_absolute() {
            self.database.path.clone()
        } else {
            root.join(&self.database.path).display().to_string()
        }
    }

    /// Runner settings derived from this config
    pub fn migrator_config(&self) -> MigratorConfig {
        MigratorConfig {
            table: self.ledger.table.clone(),
            on_catalog_error: self.ledger.on_catalog_error,
            transaction: self.transaction,
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
