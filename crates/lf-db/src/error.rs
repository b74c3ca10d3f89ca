//! Error types for lf-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Constraint violation, e.g. a duplicate value in a UNIQUE column (D004)
    #[error("[D004] Constraint violated: {0}")]
    ConstraintViolation(String),

    /// Query or row-scan error (D005)
    #[error("[D005] Query failed: {0}")]
    QueryError(String),

    /// Creating a table or view whose name is taken (D007)
    #[error("[D007] Relation already exists: {0}")]
    AlreadyExists(String),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for catalog or
        // constraint failures, so classify on the message text.
        let msg = err.to_string();
        if msg.contains("already exists") {
            DbError::AlreadyExists(msg)
        } else if msg.contains("Catalog Error")
            && (msg.contains("does not exist") || msg.contains("not found"))
            && (msg.contains("Table") || msg.contains("View"))
        {
            DbError::TableNotFound(msg)
        } else if msg.contains("Constraint Error") || msg.contains("Duplicate key") {
            DbError::ConstraintViolation(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

impl DbError {
    /// Whether this error came from a uniqueness or other constraint check.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, DbError::ConstraintViolation(_))
    }
}
