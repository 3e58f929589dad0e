//! SQLite database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{DatabaseCore, DatabaseSchema, DatabaseTransaction};
use crate::value::SqlValue;
use ld_core::sql_utils::split_qualified_name;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite database backend
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Create a new in-memory SQLite connection
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DbError::ConnectionError(format!("failed to open in-memory database: {e}")))?;
        Self::configure(conn)
    }

    /// Create a new SQLite connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| DbError::ConnectionError(format!("failed to set pragmas: {e}")))?;
        Self::configure(conn)
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn configure(conn: Connection) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| DbError::ConnectionError(format!("failed to set pragmas: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Real(v) => Value::Real(*v),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Blob(b) => Value::Blob(b.clone()),
    }
}

fn from_sqlite(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(v),
        Value::Real(v) => SqlValue::Real(v),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
    }
}

impl DatabaseCore for SqliteBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        let conn = self.connection()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.connection()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn execute_with(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        let conn = self.connection()?;
        conn.execute(sql, params_from_iter(params.iter().map(to_sqlite)))
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn query_column(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<SqlValue>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))?;
        let rows = stmt
            .query_map(params_from_iter(params.iter().map(to_sqlite)), |row| {
                row.get::<_, Value>(0)
            })
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))?;

        let mut values = Vec::new();
        for row in rows {
            let value = row.map_err(|e| DbError::ExecutionError(e.to_string()))?;
            values.push(from_sqlite(value));
        }
        Ok(values)
    }

    fn db_type(&self) -> &'static str {
        "sqlite"
    }
}

impl DatabaseSchema for SqliteBackend {
    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        // Each attached SQLite schema carries its own catalog table
        let (schema, table) = split_qualified_name(name);
        let sql = format!(
            "SELECT COUNT(*) FROM {}.sqlite_master WHERE type IN ('table', 'view') AND name = ?",
            self.quote_ident(schema)
        );
        let count = self.query_column(&sql, &[SqlValue::from(table)])?;
        Ok(count.first().and_then(SqlValue::as_i64).unwrap_or(0) > 0)
    }
}

impl DatabaseTransaction for SqliteBackend {
    fn begin(&self) -> DbResult<()> {
        self.execute_batch("BEGIN")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))
    }

    fn commit(&self) -> DbResult<()> {
        self.execute_batch("COMMIT")
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))
    }

    fn rollback(&self) -> DbResult<()> {
        self.execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
