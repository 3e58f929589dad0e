//! Database capability traits
//!
//! The migration engine only talks to a database through these traits. Each
//! backend supplies its own table probing and identifier quoting so the
//! engine itself stays engine-agnostic.

use crate::error::DbResult;
use crate::value::SqlValue;
use ld_core::sql_utils;

/// Statement execution and simple queries.
pub trait DatabaseCore: Send + Sync {
    /// Execute a single SQL statement, returns affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a single statement with positional `?` parameters
    fn execute_with(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Run a query and return the first column of every row
    fn query_column(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<SqlValue>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Engine-specific metadata probing and identifier quoting.
pub trait DatabaseSchema: Send + Sync {
    /// Check if a table or view exists. `name` may be schema-qualified.
    fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Quote a single identifier using the engine's rules
    fn quote_ident(&self, ident: &str) -> String {
        sql_utils::quote_ident(ident)
    }

    /// Quote a potentially schema-qualified name component by component
    fn quote_qualified(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.quote_ident(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Explicit transaction demarcation.
pub trait DatabaseTransaction: Send + Sync {
    /// Whether this backend can group statements atomically
    fn supports_transactions(&self) -> bool {
        true
    }

    fn begin(&self) -> DbResult<()>;

    fn commit(&self) -> DbResult<()>;

    fn rollback(&self) -> DbResult<()>;
}

/// Full capability set required by the migration engine.
pub trait Database: DatabaseCore + DatabaseSchema + DatabaseTransaction {}

impl<T: DatabaseCore + DatabaseSchema + DatabaseTransaction + ?Sized> Database for T {}
