//! ld-db - Database abstraction layer for Ladder
//!
//! This crate provides the `Database` capability traits used by the migration
//! engine, and implementations for DuckDB and SQLite.

pub mod duckdb;
pub mod error;
pub mod sqlite;
pub mod traits;
pub mod transaction;
pub mod value;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use sqlite::SqliteBackend;
pub use traits::{Database, DatabaseCore, DatabaseSchema, DatabaseTransaction};
pub use transaction::with_transaction;
pub use value::SqlValue;

use ld_core::{DatabaseConfig, DbType};

/// Open the backend selected by `config`.
pub fn open_database(config: &DatabaseConfig) -> DbResult<Box<dyn Database>> {
    log::debug!("Opening {} database at {}", config.db_type, config.path);
    match config.db_type {
        DbType::DuckDb => Ok(Box::new(DuckDbBackend::new(&config.path)?)),
        DbType::Sqlite => Ok(Box::new(SqliteBackend::new(&config.path)?)),
    }
}
