//! Durable storage of the current schema version.
//!
//! The version table has two columns, `version` and `updated_at`. In
//! append-log mode every applied version adds a row; in single-row mode one
//! row is overwritten. Either way the current version is `MAX(version)`,
//! since versions never decrease.

use crate::error::{MigrateError, MigrateResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use ld_core::VersionStorage;
use ld_db::{Database, DbError, DbResult, SqlValue};
use serde::Serialize;

const VERSION_COLUMN: &str = "version";
const UPDATED_AT_COLUMN: &str = "updated_at";

/// The most recent entry of the version table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub version: u32,
    /// `None` when the stored timestamp could not be parsed
    pub updated_at: Option<DateTime<Utc>>,
}

/// Reads and writes the version table. The only writer of the version.
pub struct VersionStore<'a> {
    db: &'a dyn Database,
    table: String,
    storage: VersionStorage,
    quoted_table: String,
    quoted_version: String,
    quoted_updated_at: String,
}

impl<'a> VersionStore<'a> {
    pub fn new(db: &'a dyn Database, table: &str, storage: VersionStorage) -> Self {
        Self {
            db,
            table: table.to_string(),
            storage,
            quoted_table: db.quote_qualified(table),
            quoted_version: db.quote_ident(VERSION_COLUMN),
            quoted_updated_at: db.quote_ident(UPDATED_AT_COLUMN),
        }
    }

    /// Unquoted table name, as configured
    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn storage(&self) -> VersionStorage {
        self.storage
    }

    /// Whether the version table exists
    pub fn exists(&self) -> MigrateResult<bool> {
        Ok(self.db.relation_exists(&self.table)?)
    }

    /// The current version, or `None` when the version table does not exist.
    ///
    /// An existing table without any non-NULL version is an error rather than
    /// an uninitialized database.
    pub fn read_current_version(&self) -> MigrateResult<Option<u32>> {
        if !self.exists()? {
            return Ok(None);
        }

        let sql = format!(
            "SELECT MAX({}) FROM {}",
            self.quoted_version, self.quoted_table
        );
        let value = self.db.query_column(&sql, &[])?.into_iter().next();
        match value {
            None | Some(SqlValue::Null) => Err(MigrateError::EmptyVersionTable {
                table: self.table.clone(),
            }),
            Some(SqlValue::Integer(v)) => {
                u32::try_from(v)
                    .map(Some)
                    .map_err(|_| MigrateError::InvalidVersion {
                        table: self.table.clone(),
                        value: v.to_string(),
                    })
            }
            Some(other) => Err(MigrateError::InvalidVersion {
                table: self.table.clone(),
                value: other.to_string(),
            }),
        }
    }

    /// The current version together with the time it was written.
    pub fn latest_record(&self) -> MigrateResult<Option<VersionRecord>> {
        let Some(version) = self.read_current_version()? else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT CAST({updated_at} AS VARCHAR) FROM {table} WHERE {version} = ? ORDER BY {updated_at} DESC LIMIT 1",
            updated_at = self.quoted_updated_at,
            table = self.quoted_table,
            version = self.quoted_version,
        );
        let updated_at = self
            .db
            .query_column(&sql, &[SqlValue::from(version)])?
            .into_iter()
            .next()
            .and_then(|value| value.as_str().and_then(parse_timestamp));

        Ok(Some(VersionRecord {
            version,
            updated_at,
        }))
    }

    /// Create the version table and record version 0.
    ///
    /// Fails if the table already exists.
    pub fn initialize(&self) -> MigrateResult<()> {
        log::info!(
            "Creating version table {} on {}",
            self.table,
            self.db.db_type()
        );
        let sql = format!(
            "CREATE TABLE {} ({} INTEGER NOT NULL, {} VARCHAR NOT NULL)",
            self.quoted_table, self.quoted_version, self.quoted_updated_at
        );
        self.db
            .execute_batch(&sql)
            .map_err(|e| MigrateError::Initialization {
                message: format!("failed to create {}: {e}", self.table),
            })?;

        self.insert_version(0)
            .map_err(|e| MigrateError::Initialization {
                message: format!("failed to record version 0 in {}: {e}", self.table),
            })
    }

    /// Persist `version` as the current version.
    pub fn write_version(&self, version: u32) -> DbResult<()> {
        match self.storage {
            VersionStorage::AppendLog => self.insert_version(version),
            VersionStorage::SingleRow => self.overwrite_version(version),
        }
    }

    /// Drop the version table, forgetting all recorded progress.
    pub fn drop_table(&self) -> MigrateResult<()> {
        log::warn!("Dropping version table {}", self.table);
        self.db
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", self.quoted_table))?;
        Ok(())
    }

    fn insert_version(&self, version: u32) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES (?, ?)",
            self.quoted_table, self.quoted_version, self.quoted_updated_at
        );
        self.db
            .execute_with(&sql, &[SqlValue::from(version), SqlValue::from(now())])?;
        Ok(())
    }

    fn overwrite_version(&self, version: u32) -> DbResult<()> {
        let sql = format!(
            "UPDATE {} SET {} = ?, {} = ?",
            self.quoted_table, self.quoted_version, self.quoted_updated_at
        );
        let updated = self
            .db
            .execute_with(&sql, &[SqlValue::from(version), SqlValue::from(now())])?;
        if updated == 0 {
            return Err(DbError::ExecutionError(format!(
                "no row to update in {}",
                self.table
            )));
        }
        Ok(())
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Parse a stored timestamp: RFC 3339 as written by [`VersionStore`], or the
/// `YYYY-MM-DD HH:MM:SS[.f]` form engines produce for TIMESTAMP columns.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .ok()
        })
}

#[cfg(test)]
#[path = "version_store_test.rs"]
mod tests;
