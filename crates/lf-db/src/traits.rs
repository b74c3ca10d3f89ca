//! Database trait definition

use crate::error::DbResult;

/// Synchronous SQL boundary used by the migration runner.
///
/// Every call blocks until the database has answered. Statements run with
/// auto-commit semantics unless the caller issues its own `BEGIN`/`COMMIT`.
pub trait Database: Send + Sync {
    /// Execute one or more `;`-separated statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a single statement binding `params` to its positional `?` placeholders
    fn execute_with_params(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Run a query and scan the first column of every row as text
    fn query_strings(&self, sql: &str, params: &[&str]) -> DbResult<Vec<String>>;

    /// Check the catalog for a table or view.
    ///
    /// Accepts `table` or `schema.table`; unqualified names resolve against `main`.
    /// Matching ignores case, as DuckDB identifiers do.
    fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
