use super::*;
use std::fs;

fn write(dir: &Path, name: &str, sql: &str) {
    fs::write(dir.join(name), sql).unwrap();
}

#[test]
fn test_from_dir_orders_by_version() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "10_ten.sql", "SELECT 10");
    write(dir.path(), "2_two.sql", "SELECT 2");
    write(dir.path(), "001_one.sql", "SELECT 1");
    for n in 3..=9 {
        write(dir.path(), &format!("{n:03}_step.sql"), "SELECT 0");
    }
    write(dir.path(), "README.md", "not a step");

    let steps = UpdateSteps::from_dir(dir.path()).unwrap();
    assert_eq!(steps.len(), 10);
    assert_eq!(steps.get(1).unwrap().name(), "001_one");
    assert_eq!(steps.get(2).unwrap().name(), "2_two");
    assert_eq!(steps.get(10).unwrap().name(), "10_ten");
}

#[test]
fn test_from_dir_empty() {
    let dir = tempfile::tempdir().unwrap();
    let steps = UpdateSteps::from_dir(dir.path()).unwrap();
    assert!(steps.is_empty());
}

#[test]
fn test_from_dir_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = UpdateSteps::from_dir(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, MigrateError::StepLoad { .. }));
}

#[test]
fn test_from_dir_rejects_gap() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "001_one.sql", "SELECT 1");
    write(dir.path(), "003_three.sql", "SELECT 3");

    let err = UpdateSteps::from_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains("version 2 is missing"));
}

#[test]
fn test_from_dir_rejects_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "001_one.sql", "SELECT 1");
    write(dir.path(), "1_again.sql", "SELECT 1");

    let err = UpdateSteps::from_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains("duplicate version 1"));
}

#[test]
fn test_from_dir_rejects_unnumbered_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "create_goober.sql", "SELECT 1");

    let err = UpdateSteps::from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, MigrateError::StepLoad { .. }));
}

#[test]
fn test_from_dir_rejects_version_zero() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "000_init.sql", "SELECT 1");

    let err = UpdateSteps::from_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains("versions start at 1"));
}

#[test]
fn test_parse_version_requires_separator() {
    assert_eq!(parse_version(Path::new("12_add_index.sql")).unwrap(), 12);
    assert_eq!(parse_version(Path::new("7.sql")).unwrap(), 7);
    assert!(parse_version(Path::new("12abc.sql")).is_err());
}
