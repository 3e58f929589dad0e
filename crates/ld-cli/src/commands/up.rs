//! Up command - apply all pending update steps

use anyhow::{Context, Result};
use ld_migrate::MigrationRunner;

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::load_project;

/// Execute the up command
pub(crate) fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_database()?;
    let steps = project.load_steps()?;

    let mut options = project.config.migrate.clone();
    if args.no_transactions {
        options.use_transactions = false;
    }
    let runner = MigrationRunner::new(&*db, &steps, options);

    let report = match runner.ensure_up_to_date() {
        Ok(report) => report,
        Err(err) => {
            let context = match err.failed_version() {
                Some(version) => format!(
                    "Migration stopped at version {version}; the database remains at the last completed step"
                ),
                None => "Migration failed".to_string(),
            };
            return Err(err).context(context);
        }
    };

    if report.initialized {
        println!(
            "Created version table {}",
            runner.version_store().table_name()
        );
    }
    if report.is_noop() {
        println!("Already up to date at version {}.", report.to_version);
        return Ok(());
    }

    for version in &report.applied {
        let name = steps.get(*version).map(|s| s.name()).unwrap_or_default();
        println!("  applied {version:>4}  {name}");
    }
    println!(
        "\nMigrated from version {} to {} ({} step(s)).",
        report.from_version,
        report.to_version,
        report.applied.len()
    );
    Ok(())
}
