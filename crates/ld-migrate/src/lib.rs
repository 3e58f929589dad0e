//! ld-migrate - Schema version tracking and migration runner for Ladder
//!
//! A [`MigrationRunner`] reads the version recorded by a [`VersionStore`],
//! applies every pending [`UpdateStep`] in ascending order, and records the
//! new version after each step, inside one transaction per step.

pub mod error;
pub mod loader;
pub mod runner;
pub mod step;
pub mod version_store;

pub use error::{BoxError, MigrateError, MigrateResult};
pub use runner::{MigrationReport, MigrationRunner};
pub use step::{FnStep, MigrationContext, SqlStep, StepResult, UpdateStep, UpdateSteps};
pub use version_store::{VersionRecord, VersionStore};
