//! Integration tests for migrations against file-backed databases.
//!
//! Each test reopens the database between runs to show that progress lives in
//! the version table, not in the runner.

use ld_core::{DatabaseConfig, DbType, MigrateOptions};
use ld_db::{open_database, Database, SqlValue};
use ld_migrate::{MigrateError, MigrationRunner, UpdateSteps};
use std::fs;
use std::path::Path;

// ── Helpers ────────────────────────────────────────────────────────────

fn config(db_type: DbType, path: &Path) -> DatabaseConfig {
    DatabaseConfig {
        db_type,
        path: path.to_str().unwrap().to_string(),
    }
}

fn write_step(dir: &Path, name: &str, sql: &str) {
    fs::write(dir.join(name), sql).unwrap();
}

fn count(db: &dyn Database, sql: &str) -> i64 {
    db.query_column(sql, &[]).unwrap()[0].as_i64().unwrap()
}

fn engines() -> [(DbType, &'static str); 2] {
    [(DbType::DuckDb, "app.duckdb"), (DbType::Sqlite, "app.db")]
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn sql_directory_migrates_and_resumes_after_reopen() {
    for (db_type, file) in engines() {
        let dir = tempfile::tempdir().unwrap();
        let steps_dir = dir.path().join("migrations");
        fs::create_dir(&steps_dir).unwrap();
        let db_config = config(db_type, &dir.path().join(file));

        write_step(&steps_dir, "001_create_goober.sql", "CREATE TABLE goober (nut TEXT);");
        write_step(
            &steps_dir,
            "002_butter.sql",
            "INSERT INTO goober (nut) VALUES ('butter');\nCREATE TABLE nut (goober TEXT);",
        );

        {
            let db = open_database(&db_config).unwrap();
            let steps = UpdateSteps::from_dir(&steps_dir).unwrap();
            let runner = MigrationRunner::new(&*db, &steps, MigrateOptions::default());
            let report = runner.ensure_up_to_date().unwrap();
            assert_eq!(report.applied, vec![1, 2]);
        }

        write_step(
            &steps_dir,
            "003_hazel.sql",
            "INSERT INTO goober (nut) VALUES ('hazel');",
        );

        let db = open_database(&db_config).unwrap();
        let steps = UpdateSteps::from_dir(&steps_dir).unwrap();
        let runner = MigrationRunner::new(&*db, &steps, MigrateOptions::default());
        assert_eq!(runner.current_version().unwrap(), 2);

        let report = runner.ensure_up_to_date().unwrap();
        assert_eq!(report.from_version, 2);
        assert_eq!(report.applied, vec![3]);
        assert_eq!(runner.current_version().unwrap(), 3);

        let nuts = db
            .query_column("SELECT nut FROM goober ORDER BY rowid", &[])
            .unwrap();
        assert_eq!(
            nuts,
            vec![SqlValue::from("butter"), SqlValue::from("hazel")],
            "{db_type}"
        );
    }
}

#[test]
fn interrupted_run_resumes_at_the_failed_step() {
    for (db_type, file) in engines() {
        let dir = tempfile::tempdir().unwrap();
        let steps_dir = dir.path().join("migrations");
        fs::create_dir(&steps_dir).unwrap();
        let db_config = config(db_type, &dir.path().join(file));

        write_step(&steps_dir, "001_one.sql", "CREATE TABLE one (id INTEGER);");
        write_step(
            &steps_dir,
            "002_two.sql",
            "CREATE TABLE two (id INTEGER);\nINSERT INTO missing_table VALUES (1);",
        );

        {
            let db = open_database(&db_config).unwrap();
            let steps = UpdateSteps::from_dir(&steps_dir).unwrap();
            let runner = MigrationRunner::new(&*db, &steps, MigrateOptions::default());
            let err = runner.ensure_up_to_date().unwrap_err();
            assert!(matches!(err, MigrateError::StepExecution { version: 2, .. }));
        }

        // Fix the broken step and run again from a fresh connection
        write_step(&steps_dir, "002_two.sql", "CREATE TABLE two (id INTEGER);");

        let db = open_database(&db_config).unwrap();
        let steps = UpdateSteps::from_dir(&steps_dir).unwrap();
        let runner = MigrationRunner::new(&*db, &steps, MigrateOptions::default());
        assert_eq!(runner.current_version().unwrap(), 1);

        let report = runner.ensure_up_to_date().unwrap();
        assert_eq!(report.applied, vec![2], "{db_type}");
        assert!(db.relation_exists("two").unwrap());
        // version 0 plus one row per applied step
        assert_eq!(count(&*db, "SELECT COUNT(*) FROM schema_version"), 3);
    }
}

#[test]
fn auto_run_from_config_options() {
    let dir = tempfile::tempdir().unwrap();
    let db_config = config(DbType::Sqlite, &dir.path().join("auto.db"));
    let options: MigrateOptions =
        serde_yaml::from_str("auto_run: true\nversion_storage: single_row\n").unwrap();

    let mut steps = UpdateSteps::new();
    steps.push_sql("widgets", "CREATE TABLE widgets (id INTEGER)");

    let db = open_database(&db_config).unwrap();
    let runner = MigrationRunner::open(&*db, &steps, options).unwrap();
    assert_eq!(runner.current_version().unwrap(), 1);
    assert_eq!(count(&*db, "SELECT COUNT(*) FROM schema_version"), 1);
}
