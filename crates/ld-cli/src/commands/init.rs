//! Init command implementation - scaffolds a new Ladder project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::InitArgs;

const FIRST_STEP: &str = "-- Version 1: the first update step.\n\
-- Each file NNN_description.sql moves the schema from version NNN-1 to NNN.\n\
CREATE TABLE IF NOT EXISTS example (\n    id INTEGER PRIMARY KEY,\n    name TEXT NOT NULL\n);\n";

/// Execute the init command
pub(crate) fn execute(args: &InitArgs) -> Result<()> {
    validate_name(&args.name)?;

    let project_dir = Path::new(&args.name);
    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            args.name
        );
    }

    println!("Creating new Ladder project: {}\n", args.name);
    scaffold(project_dir, args)?;

    println!("  created {}/ladder.yml", args.name);
    println!("  created {}/migrations/001_create_example.sql", args.name);
    println!("\nNext: cd {} && ladder up", args.name);
    Ok(())
}

/// Reject names that could cause path traversal or confusing directory names
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
        || name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not be empty, contain '/', '\\', '..', or start with '.' or '-'",
            name
        );
    }
    Ok(())
}

fn scaffold(project_dir: &Path, args: &InitArgs) -> Result<()> {
    let migrations_dir = project_dir.join("migrations");
    fs::create_dir_all(&migrations_dir)
        .with_context(|| format!("Failed to create directory: {}", migrations_dir.display()))?;

    let config_path = project_dir.join("ladder.yml");
    fs::write(&config_path, config_template(args))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let step_path = migrations_dir.join("001_create_example.sql");
    fs::write(&step_path, FIRST_STEP)
        .with_context(|| format!("Failed to write {}", step_path.display()))?;
    Ok(())
}

fn config_template(args: &InitArgs) -> String {
    let safe_name = yaml_quoted(&args.name);
    let safe_db_path = yaml_quoted(args.database_path());
    format!(
        r#"name: "{name}"

database:
  type: {db_type}
  path: "{db_path}"

migrations_path: migrations

migrate:
  version_table: schema_version
  use_transactions: true
  version_storage: append_log

# targets:
#   prod:
#     database:
#       type: {db_type}
#       path: "/var/lib/{name}/{db_file}"
"#,
        name = safe_name,
        db_type = args.db_type.as_str(),
        db_path = safe_db_path,
        db_file = Path::new(args.database_path())
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app.db".to_string()),
    )
}

/// Escape a value for a double-quoted YAML scalar
fn yaml_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
