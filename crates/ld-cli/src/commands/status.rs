//! Status command - report current, latest, and pending versions

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ld_migrate::{MigrationRunner, UpdateSteps};
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::load_project;

/// Machine-readable status, printed by `ladder status --json`
#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub database: String,
    pub target: Option<String>,
    pub version_table: String,
    pub initialized: bool,
    pub current_version: u32,
    pub latest_version: u32,
    pub updated_at: Option<DateTime<Utc>>,
    pub pending: Vec<PendingStep>,
}

/// A step that `ladder up` would apply
#[derive(Debug, Serialize)]
pub(crate) struct PendingStep {
    pub version: u32,
    pub name: String,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_database()?;
    let steps = project.load_steps()?;
    let runner = MigrationRunner::new(&*db, &steps, project.config.migrate.clone());

    let record = runner
        .version_store()
        .latest_record()
        .context("Failed to read the version table")?;
    let report = StatusReport {
        database: format!("{} ({})", project.database.db_type, project.database.path),
        target: project.target.clone(),
        version_table: project.config.migrate.version_table.clone(),
        initialized: record.is_some(),
        current_version: record.as_ref().map_or(0, |r| r.version),
        latest_version: runner.latest_version(),
        updated_at: record.and_then(|r| r.updated_at),
        pending: pending_steps(&steps, &runner)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_status(&report);
    }
    Ok(())
}

fn pending_steps(steps: &UpdateSteps, runner: &MigrationRunner<'_>) -> Result<Vec<PendingStep>> {
    let versions = runner
        .pending_versions()
        .context("Failed to compute pending versions")?;
    Ok(versions
        .into_iter()
        .map(|version| PendingStep {
            version,
            name: steps
                .get(version)
                .map(|step| step.name().to_string())
                .unwrap_or_default(),
        })
        .collect())
}

fn print_status(report: &StatusReport) {
    println!("Database:        {}", report.database);
    if let Some(target) = &report.target {
        println!("Target:          {target}");
    }
    println!("Version table:   {}", report.version_table);
    if report.initialized {
        match report.updated_at {
            Some(at) => println!(
                "Current version: {} (recorded {})",
                report.current_version,
                at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => println!("Current version: {}", report.current_version),
        }
    } else {
        println!("Current version: none (version table not created yet)");
    }
    println!("Latest version:  {}", report.latest_version);

    if report.pending.is_empty() {
        println!("\nUp to date.");
    } else {
        println!("\nPending steps ({}):", report.pending.len());
        for step in &report.pending {
            println!("  {:>4}  {}", step.version, step.name);
        }
    }
}
