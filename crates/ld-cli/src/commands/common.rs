//! Shared helpers for commands that work on an existing project

use anyhow::{Context, Result};
use ld_core::{Config, DatabaseConfig};
use ld_db::{open_database, Database};
use ld_migrate::UpdateSteps;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// A loaded project: its configuration plus everything needed to migrate.
pub(crate) struct Project {
    pub config: Config,
    pub root: PathBuf,
    pub database: DatabaseConfig,
    pub target: Option<String>,
}

/// Load ladder.yml from `--config` or the project directory.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project configuration")?;

    let target = Config::resolve_target(global.target.as_deref());
    let database = config
        .get_database_config(target.as_deref())
        .context("Failed to resolve database target")?;

    log::debug!(
        "Project '{}' using {} database at {}",
        config.name,
        database.db_type,
        database.path
    );

    Ok(Project {
        config,
        root,
        database,
        target,
    })
}

impl Project {
    /// Open the configured database. Relative file paths resolve against
    /// the project directory.
    pub(crate) fn open_database(&self) -> Result<Box<dyn Database>> {
        let mut database = self.database.clone();
        if database.path != ":memory:" && Path::new(&database.path).is_relative() {
            database.path = self.root.join(&database.path).display().to_string();
        }
        open_database(&database)
            .with_context(|| format!("Failed to open {} database at {}", database.db_type, database.path))
    }

    /// Load the numbered SQL steps from the migrations directory.
    pub(crate) fn load_steps(&self) -> Result<UpdateSteps> {
        let dir = self.config.migrations_path_absolute(&self.root);
        let steps = UpdateSteps::from_dir(&dir)
            .with_context(|| format!("Failed to load update steps from {}", dir.display()))?;
        log::debug!("Loaded {} update step(s) from {}", steps.len(), dir.display());
        Ok(steps)
    }
}
