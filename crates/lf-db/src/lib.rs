//! lf-db - Database boundary for Ledgerflow
//!
//! This crate provides the synchronous `Database` trait the migration runner
//! talks to, and a DuckDB implementation of it.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
