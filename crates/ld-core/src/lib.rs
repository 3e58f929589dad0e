//! ld-core - Core library for Ladder
//!
//! This crate provides configuration parsing, the shared error type, and SQL
//! identifier helpers used by the database and migration crates.

pub mod config;
pub mod error;
pub mod sql_utils;

pub use config::{Config, DatabaseConfig, DbType, MigrateOptions, TargetConfig, VersionStorage};
pub use error::{CoreError, CoreResult};
