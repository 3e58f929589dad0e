//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{DatabaseCore, DatabaseSchema, DatabaseTransaction};
use crate::value::SqlValue;
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection};
use ld_core::sql_utils::split_qualified_name;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn connection(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

fn to_duckdb(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::BigInt(*v),
        SqlValue::Real(v) => Value::Double(*v),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Blob(b) => Value::Blob(b.clone()),
    }
}

fn from_duckdb(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Integer(i64::from(b)),
        Value::TinyInt(v) => SqlValue::Integer(i64::from(v)),
        Value::SmallInt(v) => SqlValue::Integer(i64::from(v)),
        Value::Int(v) => SqlValue::Integer(i64::from(v)),
        Value::BigInt(v) => SqlValue::Integer(v),
        Value::UTinyInt(v) => SqlValue::Integer(i64::from(v)),
        Value::USmallInt(v) => SqlValue::Integer(i64::from(v)),
        Value::UInt(v) => SqlValue::Integer(i64::from(v)),
        Value::HugeInt(v) => i64::try_from(v)
            .map(SqlValue::Integer)
            .unwrap_or_else(|_| SqlValue::Text(v.to_string())),
        Value::UBigInt(v) => i64::try_from(v)
            .map(SqlValue::Integer)
            .unwrap_or_else(|_| SqlValue::Text(v.to_string())),
        Value::Float(v) => SqlValue::Real(f64::from(v)),
        Value::Double(v) => SqlValue::Real(v),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
        other => SqlValue::Text(format!("{other:?}")),
    }
}

impl DatabaseCore for DuckDbBackend {
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
        conn.execute(sql, params_from_iter(params.iter().map(to_duckdb)))
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn query_column(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<SqlValue>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))?;
        let rows = stmt
            .query_map(params_from_iter(params.iter().map(to_duckdb)), |row| {
                row.get::<_, Value>(0)
            })
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))?;

        let mut values = Vec::new();
        for row in rows {
            let value = row.map_err(|e| DbError::ExecutionError(e.to_string()))?;
            values.push(from_duckdb(value));
        }
        Ok(values)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

impl DatabaseSchema for DuckDbBackend {
    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = split_qualified_name(name);
        let count = self.query_column(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            &[SqlValue::from(schema), SqlValue::from(table)],
        )?;
        Ok(count.first().and_then(SqlValue::as_i64).unwrap_or(0) > 0)
    }
}

impl DatabaseTransaction for DuckDbBackend {
    fn begin(&self) -> DbResult<()> {
        self.execute_batch("BEGIN TRANSACTION")
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
#[path = "duckdb_test.rs"]
mod tests;
