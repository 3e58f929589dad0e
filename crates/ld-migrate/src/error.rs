//! Error types for ld-migrate

use ld_db::DbError;
use thiserror::Error;

/// Boxed error returned by application-supplied update steps.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Migration errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The version table could not be created, or holds no readable version
    /// right after creation (M001).
    #[error("[M001] Version table initialization failed: {message}")]
    Initialization { message: String },

    /// An update step failed (M002).
    #[error("[M002] Update step {version} ({name}) failed: {source}")]
    StepExecution {
        version: u32,
        name: String,
        #[source]
        source: BoxError,
    },

    /// The step succeeded but its version could not be recorded (M003).
    #[error("[M003] Failed to record version {version}: {source}")]
    VersionWrite {
        version: u32,
        #[source]
        source: DbError,
    },

    /// The version table exists but has no usable row (M004).
    #[error("[M004] Version table {table} exists but holds no version")]
    EmptyVersionTable { table: String },

    /// The version table holds a value that is not a valid version (M005).
    #[error("[M005] Version table {table} holds an invalid version: {value}")]
    InvalidVersion { table: String, value: String },

    /// BEGIN or COMMIT failed around the step producing `version` (M006).
    #[error("[M006] Transaction for version {version} failed: {source}")]
    Transaction {
        version: u32,
        #[source]
        source: DbError,
    },

    /// No step exists for the requested version (M007).
    #[error("[M007] No update step for version {version} (latest is {latest})")]
    UnknownStep { version: u32, latest: u32 },

    /// A step was requested out of sequence (M008).
    #[error("[M008] Cannot apply version {version}: database is at version {current}")]
    OutOfOrder { version: u32, current: u32 },

    /// Update steps could not be loaded from disk (M009).
    #[error("[M009] Failed to load update steps: {message}")]
    StepLoad { message: String },

    /// Any other statement failure, propagated verbatim (M010).
    #[error("[M010] {0}")]
    Database(#[from] DbError),
}

impl MigrateError {
    /// The version whose step failed, for step-scoped failures.
    pub fn failed_version(&self) -> Option<u32> {
        match self {
            MigrateError::StepExecution { version, .. }
            | MigrateError::VersionWrite { version, .. }
            | MigrateError::Transaction { version, .. }
            | MigrateError::OutOfOrder { version, .. }
            | MigrateError::UnknownStep { version, .. } => Some(*version),
            _ => None,
        }
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
