//! Migration runner for Ledgerflow.
//!
//! Applies an ordered list of named migrations to a database exactly once
//! each, recording applied names in a ledger table. The runner skips names
//! already in the ledger, executes the rest in list order, stops at the first
//! failure and records everything that succeeded before it.

pub mod config;
pub mod error;
pub mod ledger;
pub mod loader;
pub mod migration;
pub mod runner;

pub use config::{CatalogCheckPolicy, Config, MigratorConfig, TransactionMode};
pub use error::{MigrateError, MigrateResult};
pub use ledger::{AppendFailure, AppendReport, LedgerStore, TableStatus, DEFAULT_LEDGER_TABLE};
pub use loader::load_migrations;
pub use migration::{Migration, SqlMigration};
pub use runner::{MigrationStatus, Migrator, RunOutcome, RunReport};
