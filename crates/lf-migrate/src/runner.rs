//! The apply loop.
//!
//! A run bootstraps the ledger, loads the applied names, then walks the
//! caller's list in order: applied names are skipped, the rest are executed
//! one by one until the first failure. Names that succeeded are appended to
//! the ledger in a single batch at the end.

use crate::config::{MigratorConfig, TransactionMode};
use crate::error::MigrateResult;
use crate::ledger::{is_applied, validate_table_name, AppendFailure, LedgerStore, TableStatus};
use crate::migration::Migration;
use lf_db::{Database, DbError};
use serde::Serialize;

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every pending migration executed
    Completed { applied: Vec<String> },
    /// `failed` errored; nothing after it was attempted
    Aborted {
        applied: Vec<String>,
        failed: String,
        error: DbError,
    },
}

impl RunOutcome {
    /// Names executed during this run, in execution order
    pub fn applied(&self) -> &[String] {
        match self {
            RunOutcome::Completed { applied } | RunOutcome::Aborted { applied, .. } => applied,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// Everything a caller can learn about one run.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Candidates skipped because the ledger already had them
    pub skipped: usize,
    /// Executed migrations whose ledger insert failed
    pub unrecorded: Vec<AppendFailure>,
}

/// Applied/pending state of one candidate migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub name: String,
    pub applied: bool,
}

/// Applies migrations against a database, tracking them in one ledger table.
#[derive(Debug, Clone)]
pub struct Migrator {
    ledger: LedgerStore,
    config: MigratorConfig,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Migrator {
    /// Runner using the default ledger table
    pub fn new() -> Self {
        Self::from_config(MigratorConfig::default())
    }

    /// Runner using a caller-chosen ledger table
    pub fn with_table(table: impl Into<String>) -> Self {
        Self::from_config(MigratorConfig {
            table: table.into(),
            ..MigratorConfig::default()
        })
    }

    pub fn from_config(config: MigratorConfig) -> Self {
        Self {
            ledger: LedgerStore::new(config.table.clone()),
            config,
        }
    }

    pub fn table(&self) -> &str {
        self.ledger.table()
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Apply every migration in `migrations` that the ledger does not list yet.
    ///
    /// Returns `Err` only when the ledger itself cannot be prepared or read.
    /// A failing migration ends the run with [`RunOutcome::Aborted`]; the
    /// migrations before it are still recorded.
    pub fn run<M: Migration>(
        &self,
        db: &dyn Database,
        migrations: &[M],
    ) -> MigrateResult<RunReport> {
        self.ledger.ensure_table(db, self.config.on_catalog_error)?;
        let applied = self.ledger.applied_names(db)?;

        let mut completed: Vec<String> = Vec::new();
        let mut skipped = 0;
        let mut failure: Option<(String, DbError)> = None;

        for migration in migrations {
            let name = migration.name();
            if is_applied(name, &applied) {
                skipped += 1;
                continue;
            }

            log::info!("Executing migration: [{}]...", name);
            if let Err(e) = self.execute(db, migration.upgrade_statement()) {
                log::error!("Error when executing migration [{}]: {}", name, e);
                log::error!("Aborting the current migration run...");
                failure = Some((name.to_string(), e));
                break;
            }
            completed.push(name.to_string());
        }

        let mut unrecorded = Vec::new();
        if !completed.is_empty() {
            let report = self.ledger.append_names(db, &completed)?;
            unrecorded = report.failures;
            log::info!(
                "Successfully applied {} migration(s) to the database",
                completed.len()
            );
        }

        let outcome = match failure {
            None => RunOutcome::Completed { applied: completed },
            Some((failed, error)) => RunOutcome::Aborted {
                applied: completed,
                failed,
                error,
            },
        };

        Ok(RunReport {
            outcome,
            skipped,
            unrecorded,
        })
    }

    /// Report which candidates the ledger already lists.
    ///
    /// Read-only: a missing ledger table means every candidate is pending.
    pub fn status<M: Migration>(
        &self,
        db: &dyn Database,
        migrations: &[M],
    ) -> MigrateResult<Vec<MigrationStatus>> {
        let applied = self.recorded(db)?;
        Ok(migrations
            .iter()
            .map(|m| MigrationStatus {
                name: m.name().to_string(),
                applied: is_applied(m.name(), &applied),
            })
            .collect())
    }

    /// Names in the ledger, or nothing if the table has not been created yet.
    pub fn recorded(&self, db: &dyn Database) -> MigrateResult<Vec<String>> {
        validate_table_name(self.table())?;
        match self.ledger.table_status(db) {
            TableStatus::Absent => Ok(Vec::new()),
            _ => self.ledger.applied_names(db),
        }
    }

    fn execute(&self, db: &dyn Database, sql: &str) -> Result<(), DbError> {
        match self.config.transaction {
            TransactionMode::None => db.execute_batch(sql),
            TransactionMode::PerMigration => {
                db.execute_batch("BEGIN TRANSACTION")?;
                let result = db.execute_batch(sql);
                match &result {
                    Ok(()) => {
                        if let Err(commit_err) = db.execute_batch("COMMIT") {
                            rollback(db);
                            return Err(commit_err);
                        }
                    }
                    Err(_) => rollback(db),
                }
                result
            }
        }
    }
}

fn rollback(db: &dyn Database) {
    if let Err(e) = db.execute_batch("ROLLBACK") {
        log::warn!("Rollback failed, connection may still be inside a transaction: {}", e);
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
