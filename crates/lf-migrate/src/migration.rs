//! The migration contract callers implement.

/// A named schema change.
///
/// The name identifies the migration in the ledger; the upgrade statement is
/// executed verbatim and may contain several `;`-separated statements.
pub trait Migration {
    /// Unique name recorded in the ledger once the migration has run
    fn name(&self) -> &str;

    /// SQL executed to apply the migration
    fn upgrade_statement(&self) -> &str;
}

impl<M: Migration + ?Sized> Migration for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn upgrade_statement(&self) -> &str {
        (**self).upgrade_statement()
    }
}

impl<M: Migration + ?Sized> Migration for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn upgrade_statement(&self) -> &str {
        (**self).upgrade_statement()
    }
}

/// A migration held as an owned name and SQL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlMigration {
    pub name: String,
    pub sql: String,
}

impl SqlMigration {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

impl Migration for SqlMigration {
    fn name(&self) -> &str {
        &self.name
    }

    fn upgrade_statement(&self) -> &str {
        &self.sql
    }
}
