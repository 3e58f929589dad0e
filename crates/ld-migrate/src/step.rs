//! Update steps and the context they run with.
//!
//! Versions are 1-based: the step at version `v` turns a database at version
//! `v - 1` into one at version `v`, so `UpdateSteps::len()` is the latest
//! version.

use crate::error::BoxError;
use ld_core::MigrateOptions;
use ld_db::{Database, DbResult, SqlValue};

/// Outcome of a single update step.
pub type StepResult = Result<(), BoxError>;

/// Capabilities handed to a step while it runs.
pub struct MigrationContext<'a> {
    db: &'a dyn Database,
    version: u32,
    options: &'a MigrateOptions,
    in_transaction: bool,
}

impl<'a> MigrationContext<'a> {
    pub(crate) fn new(
        db: &'a dyn Database,
        version: u32,
        options: &'a MigrateOptions,
        in_transaction: bool,
    ) -> Self {
        Self {
            db,
            version,
            options,
            in_transaction,
        }
    }

    /// The shared database connection.
    pub fn db(&self) -> &'a dyn Database {
        self.db
    }

    /// The version this step produces.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The version the database was at before this step.
    pub fn previous_version(&self) -> u32 {
        self.version - 1
    }

    /// Options of the runner executing this step.
    pub fn options(&self) -> &'a MigrateOptions {
        self.options
    }

    /// Whether this step and its version write share a transaction.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.db.execute_batch(sql)
    }

    pub fn execute_with(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.db.execute_with(sql, params)
    }
}

/// One unit of schema-transforming logic.
pub trait UpdateStep {
    /// Short description used in logs and error messages
    fn name(&self) -> &str;

    /// Transform the database from `ctx.previous_version()` to `ctx.version()`
    fn apply(&self, ctx: &MigrationContext<'_>) -> StepResult;
}

/// A step backed by a closure.
pub struct FnStep<F> {
    name: String,
    body: F,
}

impl<F> FnStep<F>
where
    F: Fn(&MigrationContext<'_>) -> StepResult,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> UpdateStep for FnStep<F>
where
    F: Fn(&MigrationContext<'_>) -> StepResult,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ctx: &MigrationContext<'_>) -> StepResult {
        (self.body)(ctx)
    }
}

/// A step that runs a batch of SQL statements.
#[derive(Debug, Clone)]
pub struct SqlStep {
    name: String,
    sql: String,
}

impl SqlStep {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl UpdateStep for SqlStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ctx: &MigrationContext<'_>) -> StepResult {
        ctx.execute_batch(&self.sql)?;
        Ok(())
    }
}

/// The ordered list of update steps known to the application.
#[derive(Default)]
pub struct UpdateSteps {
    steps: Vec<Box<dyn UpdateStep>>,
}

impl UpdateSteps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step; it becomes version `len()` after the push.
    pub fn push(&mut self, step: impl UpdateStep + 'static) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn push_fn<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&MigrationContext<'_>) -> StepResult + 'static,
    {
        self.push(FnStep::new(name, body))
    }

    pub fn push_sql(&mut self, name: impl Into<String>, sql: impl Into<String>) -> &mut Self {
        self.push(SqlStep::new(name, sql))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The version reached once every step has run.
    pub fn latest_version(&self) -> u32 {
        u32::try_from(self.steps.len()).unwrap_or(u32::MAX)
    }

    /// The step producing `version`, if any. Version 0 has no step.
    pub fn get(&self, version: u32) -> Option<&dyn UpdateStep> {
        let index = usize::try_from(version).ok()?.checked_sub(1)?;
        self.steps.get(index).map(|step| &**step)
    }

    /// Step names in version order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.name())
    }
}

impl std::fmt::Debug for UpdateSteps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
#[path = "step_test.rs"]
mod tests;
