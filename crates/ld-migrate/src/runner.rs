//! Sequential migration runner.
//!
//! [`MigrationRunner::ensure_up_to_date`] walks the database from its recorded
//! version to the latest version one step at a time. Each step and the write
//! of its version form one transactional unit, so a crash or failure leaves
//! the recorded version at the last fully applied step.

use crate::error::{MigrateError, MigrateResult};
use crate::step::{MigrationContext, UpdateSteps};
use crate::version_store::VersionStore;
use ld_core::MigrateOptions;
use ld_db::{with_transaction, Database};
use serde::Serialize;

/// Summary of one `ensure_up_to_date` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// The version table was created during this run
    pub initialized: bool,
    pub from_version: u32,
    pub to_version: u32,
    /// Versions applied, in order
    pub applied: Vec<u32>,
}

impl MigrationReport {
    /// True when no step ran
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Brings a database to the latest version of a set of update steps.
///
/// The runner holds no state of its own: everything it knows about progress
/// is read from the version table.
pub struct MigrationRunner<'a> {
    db: &'a dyn Database,
    steps: &'a UpdateSteps,
    store: VersionStore<'a>,
    options: MigrateOptions,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(db: &'a dyn Database, steps: &'a UpdateSteps, options: MigrateOptions) -> Self {
        let store = VersionStore::new(db, &options.version_table, options.version_storage);
        Self {
            db,
            steps,
            store,
            options,
        }
    }

    /// Create a runner and, when `auto_run` is set, bring the database up to
    /// date immediately.
    pub fn open(
        db: &'a dyn Database,
        steps: &'a UpdateSteps,
        options: MigrateOptions,
    ) -> MigrateResult<Self> {
        let runner = Self::new(db, steps, options);
        if runner.options.auto_run {
            runner.ensure_up_to_date()?;
        }
        Ok(runner)
    }

    pub fn options(&self) -> &MigrateOptions {
        &self.options
    }

    pub fn version_store(&self) -> &VersionStore<'a> {
        &self.store
    }

    /// Number of defined steps
    pub fn latest_version(&self) -> u32 {
        self.steps.latest_version()
    }

    /// The recorded version; an uninitialized database reports 0.
    pub fn current_version(&self) -> MigrateResult<u32> {
        Ok(self.store.read_current_version()?.unwrap_or(0))
    }

    /// Versions that `ensure_up_to_date` would apply, in order.
    pub fn pending_versions(&self) -> MigrateResult<Vec<u32>> {
        let current = self.current_version()?;
        Ok((current.saturating_add(1)..=self.latest_version()).collect())
    }

    /// Whether steps run inside transactions on this backend.
    pub fn uses_transactions(&self) -> bool {
        self.options.use_transactions && self.db.supports_transactions()
    }

    /// Apply every pending step in ascending order.
    ///
    /// Stops at the first failure; versions applied before it stay recorded.
    pub fn ensure_up_to_date(&self) -> MigrateResult<MigrationReport> {
        let (current, initialized) = self.current_or_initialize()?;
        let latest = self.latest_version();
        if current >= latest {
            if current > latest {
                log::warn!(
                    "Database is at version {current} but only {latest} update step(s) are defined; nothing to apply"
                );
            } else {
                log::info!("Database is up to date at version {current}");
            }
            return Ok(MigrationReport {
                initialized,
                from_version: current,
                to_version: current,
                applied: Vec::new(),
            });
        }

        log::info!(
            "Migrating {} from version {current} to {latest}",
            self.db.db_type()
        );
        if !self.uses_transactions() {
            log::warn!(
                "Running update steps without transactions: a failure can leave the schema ahead of its recorded version"
            );
        }

        let mut applied = Vec::new();
        for version in (current + 1)..=latest {
            self.apply_step(version)?;
            applied.push(version);
        }

        log::info!("Applied {} update step(s), now at version {latest}", applied.len());
        Ok(MigrationReport {
            initialized,
            from_version: current,
            to_version: latest,
            applied,
        })
    }

    /// Apply the single step producing `version`.
    ///
    /// The database must be at `version - 1`. An uninitialized database is
    /// initialized first.
    pub fn apply_version(&self, version: u32) -> MigrateResult<()> {
        let latest = self.latest_version();
        if version == 0 || version > latest {
            return Err(MigrateError::UnknownStep { version, latest });
        }
        let (current, _) = self.current_or_initialize()?;
        if current.checked_add(1) != Some(version) {
            return Err(MigrateError::OutOfOrder { version, current });
        }
        self.apply_step(version)
    }

    /// The recorded version, creating the version table first if needed.
    fn current_or_initialize(&self) -> MigrateResult<(u32, bool)> {
        self.options
            .validate()
            .map_err(|e| MigrateError::Initialization {
                message: e.to_string(),
            })?;
        if let Some(version) = self.store.read_current_version()? {
            return Ok((version, false));
        }

        self.initialize()?;
        let version = self
            .store
            .read_current_version()?
            .ok_or_else(|| MigrateError::Initialization {
                message: format!(
                    "version table {} is still missing after initialization",
                    self.store.table_name()
                ),
            })?;
        Ok((version, true))
    }

    fn initialize(&self) -> MigrateResult<()> {
        if self.uses_transactions() {
            with_transaction(self.db, |_| self.store.initialize())
        } else {
            self.store.initialize()
        }
    }

    fn apply_step(&self, version: u32) -> MigrateResult<()> {
        let latest = self.latest_version();
        let step = self
            .steps
            .get(version)
            .ok_or(MigrateError::UnknownStep { version, latest })?;
        let transactional = self.uses_transactions();
        log::debug!("Applying update step {version} ({})", step.name());

        let unit = || -> MigrateResult<()> {
            let ctx = MigrationContext::new(self.db, version, &self.options, transactional);
            step.apply(&ctx)
                .map_err(|source| MigrateError::StepExecution {
                    version,
                    name: step.name().to_string(),
                    source,
                })?;
            self.store
                .write_version(version)
                .map_err(|source| MigrateError::VersionWrite { version, source })
        };

        if transactional {
            // Errors from the body are already step-scoped; a bare database
            // error can only come from BEGIN or COMMIT.
            with_transaction(self.db, |_| unit()).map_err(|err| match err {
                MigrateError::Database(source) => MigrateError::Transaction { version, source },
                other => other,
            })
        } else {
            unit()
        }
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
