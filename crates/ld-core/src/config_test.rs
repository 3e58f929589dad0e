use super::*;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: app").unwrap();
    assert_eq!(config.name, "app");
    assert_eq!(config.database, DatabaseConfig::default());
    assert_eq!(config.database.path, ":memory:");
    assert_eq!(config.migrations_path, "migrations");
    assert_eq!(config.migrate, MigrateOptions::default());
}

#[test]
fn test_migrate_option_defaults() {
    let options = MigrateOptions::default();
    assert_eq!(options.version_table, "schema_version");
    assert!(options.use_transactions);
    assert!(!options.auto_run);
    assert_eq!(options.version_storage, VersionStorage::AppendLog);
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: inventory
database:
  type: sqlite
  path: "./inventory.db"
migrations_path: db/steps
migrate:
  version_table: meta.versions
  use_transactions: false
  auto_run: true
  version_storage: single_row
targets:
  prod:
    database:
      type: duckdb
      path: "/var/lib/inventory.duckdb"
  ci: {}
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.database.db_type, DbType::Sqlite);
    assert_eq!(config.database.path, "./inventory.db");
    assert_eq!(config.migrations_path, "db/steps");
    assert_eq!(config.migrate.version_table, "meta.versions");
    assert!(!config.migrate.use_transactions);
    assert!(config.migrate.auto_run);
    assert_eq!(config.migrate.version_storage, VersionStorage::SingleRow);
    assert_eq!(config.available_targets(), vec!["ci", "prod"]);
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: app\nmigrate:\n  auto_migrate: true\n");
    assert!(result.is_err());
}

#[test]
fn test_get_database_config_target_override() {
    let yaml = r#"
name: app
database:
  type: sqlite
  path: dev.db
targets:
  prod:
    database:
      type: duckdb
      path: prod.duckdb
  staging: {}
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();

    let base = config.get_database_config(None).unwrap();
    assert_eq!(base.db_type, DbType::Sqlite);

    let prod = config.get_database_config(Some("prod")).unwrap();
    assert_eq!(prod.db_type, DbType::DuckDb);
    assert_eq!(prod.path, "prod.duckdb");

    // A target without a database block falls back to the base config
    let staging = config.get_database_config(Some("staging")).unwrap();
    assert_eq!(staging, base);
}

#[test]
fn test_get_database_config_unknown_target() {
    let config: Config = serde_yaml::from_str("name: app").unwrap();
    let err = config.get_database_config(Some("nope")).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    assert!(err.to_string().contains("nope"));
}

#[test]
fn test_resolve_target_prefers_cli_flag() {
    assert_eq!(
        Config::resolve_target(Some("prod")),
        Some("prod".to_string())
    );
}

#[test]
fn test_load_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ladder.yml"),
        "name: from_disk\nmigrations_path: steps\n",
    )
    .unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_disk");
    assert_eq!(
        config.migrations_path_absolute(dir.path()),
        dir.path().join("steps")
    );
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_rejects_empty_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ladder.yml");
    std::fs::write(&path, "name: \"\"\n").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_load_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ladder.yml");
    std::fs::write(&path, "name: [unclosed\n").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
}

#[test]
fn test_validate_rejects_bad_version_table() {
    let mut options = MigrateOptions::default();
    options.version_table = "meta.".to_string();
    assert!(options.validate().is_err());

    options.version_table = "  ".to_string();
    assert!(options.validate().is_err());

    options.version_table = "meta.schema_version".to_string();
    assert!(options.validate().is_ok());
}

#[test]
fn test_validate_rejects_catalog_qualified_version_table() {
    let options = MigrateOptions {
        version_table: "memory.main.schema_version".to_string(),
        ..MigrateOptions::default()
    };
    let err = options.validate().unwrap_err();
    assert!(err.to_string().contains("schema.table"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ladder.yml");
    std::fs::write(
        &path,
        "name: app\nmigrate:\n  version_table: memory.main.schema_version\n",
    )
    .unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}
