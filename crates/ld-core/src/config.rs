//! Configuration types and parsing for ladder.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `--target` flag is given.
pub const TARGET_ENV_VAR: &str = "LADDER_TARGET";

/// Main project configuration from ladder.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directory containing numbered `.sql` update steps
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Migration runner options
    #[serde(default)]
    pub migrate: MigrateOptions,

    /// Named target configurations (e.g., dev, staging, prod)
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
    /// SQLite
    Sqlite,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
            DbType::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type (duckdb or sqlite)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

/// How the version table stores successive versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VersionStorage {
    /// Append one row per applied version (default)
    #[default]
    AppendLog,
    /// Keep a single row and overwrite it
    SingleRow,
}

impl std::fmt::Display for VersionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionStorage::AppendLog => write!(f, "append_log"),
            VersionStorage::SingleRow => write!(f, "single_row"),
        }
    }
}

/// Options controlling the migration runner.
///
/// Defaults: table `schema_version`, transactions on, no auto-run,
/// append-only version log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateOptions {
    /// Name of the version table, optionally schema-qualified
    #[serde(default = "default_version_table")]
    pub version_table: String,

    /// Wrap each step and its version write in one transaction
    #[serde(default = "default_true")]
    pub use_transactions: bool,

    /// Bring the database up to date as soon as the runner is opened
    #[serde(default)]
    pub auto_run: bool,

    /// Version table storage style
    #[serde(default)]
    pub version_storage: VersionStorage,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            version_table: default_version_table(),
            use_transactions: true,
            auto_run: false,
            version_storage: VersionStorage::default(),
        }
    }
}

impl MigrateOptions {
    /// Validate option values that serde cannot check on its own.
    pub fn validate(&self) -> CoreResult<()> {
        if self.version_table.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrate.version_table cannot be empty".to_string(),
            });
        }
        if self.version_table.split('.').any(|part| part.is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "migrate.version_table '{}' has an empty name component",
                    self.version_table
                ),
            });
        }
        if self.version_table.split('.').count() > 2 {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "migrate.version_table '{}' must be 'table' or 'schema.table'",
                    self.version_table
                ),
            });
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_version_table() -> String {
    "schema_version".to_string()
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {e}", path.display()),
            })?;
        config.validate()?;
        log::debug!("Loaded config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for ladder.yml or ladder.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("ladder.yml");
        let yaml_path = dir.join("ladder.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }
        if self.migrations_path.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path cannot be empty".to_string(),
            });
        }
        self.migrate.validate()
    }

    /// Absolute path of the migrations directory under `root`
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Names of all configured targets, sorted
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get database configuration, optionally applying target overrides
    ///
    /// If target is specified and exists, uses target's database config.
    /// Otherwise, uses the base database config.
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;

                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Resolve target from CLI flag or LADDER_TARGET environment variable
    ///
    /// Priority: CLI flag > LADDER_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var(TARGET_ENV_VAR).ok())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
