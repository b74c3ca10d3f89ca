//! Ledger table management.
//!
//! The ledger is a single-column table (`migration TEXT UNIQUE`) holding the
//! name of every migration that has been applied. Rows are only ever
//! appended; this module never deletes, drops or alters anything.

use crate::config::CatalogCheckPolicy;
use crate::error::{MigrateError, MigrateResult};
use lf_db::{Database, DbError};

/// Table name used when a runner is built without one.
pub const DEFAULT_LEDGER_TABLE: &str = "migrations";

/// Result of looking the ledger table up in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Exists,
    Absent,
    /// The lookup itself failed; existence is unknown.
    CheckFailed(String),
}

/// A ledger insert that did not go through.
#[derive(Debug)]
pub struct AppendFailure {
    pub name: String,
    pub error: DbError,
}

/// Outcome of [`LedgerStore::append_names`].
#[derive(Debug, Default)]
pub struct AppendReport {
    /// Number of names inserted
    pub recorded: usize,
    /// Names whose insert failed, in attempt order
    pub failures: Vec<AppendFailure>,
}

/// Reads and appends rows of one ledger table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStore {
    table: String,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_TABLE)
    }
}

impl LedgerStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Name of the tracking table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Look the ledger table up in the catalog.
    pub fn table_status(&self, db: &dyn Database) -> TableStatus {
        match db.relation_exists(&self.table) {
            Ok(true) => TableStatus::Exists,
            Ok(false) => TableStatus::Absent,
            Err(e) => {
                log::warn!("Couldn't check if table '{}' exists: {}", self.table, e);
                TableStatus::CheckFailed(e.to_string())
            }
        }
    }

    /// Create the ledger table unless the catalog already has it.
    ///
    /// A failed catalog lookup is handled per `policy`: either the run stops,
    /// or creation is attempted regardless.
    pub fn ensure_table(&self, db: &dyn Database, policy: CatalogCheckPolicy) -> MigrateResult<()> {
        validate_table_name(&self.table)?;

        match self.table_status(db) {
            TableStatus::Exists => return Ok(()),
            TableStatus::Absent => {}
            TableStatus::CheckFailed(reason) => match policy {
                CatalogCheckPolicy::Abort => {
                    return Err(MigrateError::CatalogCheck {
                        table: self.table.clone(),
                        reason,
                    });
                }
                CatalogCheckPolicy::AttemptCreate => {
                    log::warn!("Attempting to create ledger table '{}' anyway", self.table);
                }
            },
        }

        log::debug!("Creating ledger table '{}'", self.table);
        db.execute_batch(&format!(
            "CREATE TABLE {} (migration TEXT UNIQUE);",
            self.table
        ))
        .map_err(|source| MigrateError::LedgerCreate {
            table: self.table.clone(),
            source,
        })
    }

    /// All recorded names, sorted descending.
    pub fn applied_names(&self, db: &dyn Database) -> MigrateResult<Vec<String>> {
        validate_table_name(&self.table)?;
        db.query_strings(
            &format!("SELECT migration FROM {} ORDER BY migration DESC;", self.table),
            &[],
        )
        .map_err(|source| MigrateError::LedgerRead {
            table: self.table.clone(),
            source,
        })
    }

    /// Insert one row per name, carrying on past rows that fail.
    ///
    /// Earlier inserts are kept when a later one fails.
    pub fn append_names<S: AsRef<str>>(
        &self,
        db: &dyn Database,
        names: &[S],
    ) -> MigrateResult<AppendReport> {
        validate_table_name(&self.table)?;
        let sql = format!("INSERT INTO {} (migration) VALUES (?);", self.table);

        let mut report = AppendReport::default();
        for name in names {
            let name = name.as_ref();
            match db.execute_with_params(&sql, &[name]) {
                Ok(_) => report.recorded += 1,
                Err(error) => {
                    if error.is_constraint_violation() {
                        log::warn!(
                            "Migration [{}] is already recorded in '{}'",
                            name,
                            self.table
                        );
                    } else {
                        log::warn!(
                            "Failed to record migration [{}] in '{}': {}",
                            name,
                            self.table,
                            error
                        );
                    }
                    report.failures.push(AppendFailure {
                        name: name.to_string(),
                        error,
                    });
                }
            }
        }
        Ok(report)
    }
}

/// Linear membership check against the applied names.
pub fn is_applied(name: &str, applied: &[String]) -> bool {
    applied.iter().any(|a| a == name)
}

/// Reject anything but `ident` or `schema.ident` before it is spliced into SQL.
pub fn validate_table_name(name: &str) -> MigrateResult<()> {
    let invalid = |reason: &str| MigrateError::InvalidTableName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }

    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(invalid("expected 'table' or 'schema.table'"));
    }

    for part in parts {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            Some(_) => return Err(invalid("identifiers must start with a letter or '_'")),
            None => return Err(invalid("empty identifier")),
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("only letters, digits and '_' are allowed"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
