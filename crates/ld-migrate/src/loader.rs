//! Loading update steps from a directory of numbered SQL files.
//!
//! Files are named `NNN_description.sql`; the numeric prefix is the version
//! the file produces. Prefixes must run from 1 without gaps or duplicates.

use crate::error::{MigrateError, MigrateResult};
use crate::step::UpdateSteps;
use std::path::{Path, PathBuf};

impl UpdateSteps {
    /// Load every `*.sql` file in `dir` as a [`SqlStep`](crate::SqlStep), ordered by version.
    pub fn from_dir(dir: &Path) -> MigrateResult<Self> {
        if !dir.is_dir() {
            return Err(MigrateError::StepLoad {
                message: format!("migrations directory not found: {}", dir.display()),
            });
        }

        let mut files = Vec::new();
        for path in sql_files(dir)? {
            let version = parse_version(&path)?;
            files.push((version, path));
        }
        files.sort_by_key(|(version, _)| *version);
        check_sequence(&files)?;

        let mut steps = UpdateSteps::new();
        for (version, path) in files {
            let sql = std::fs::read_to_string(&path).map_err(|e| MigrateError::StepLoad {
                message: format!("failed to read {}: {e}", path.display()),
            })?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| version.to_string());
            log::debug!("Loaded update step {version} from {}", path.display());
            steps.push_sql(name, sql);
        }
        Ok(steps)
    }
}

fn sql_files(dir: &Path) -> MigrateResult<Vec<PathBuf>> {
    let dir_str = dir.to_str().ok_or_else(|| MigrateError::StepLoad {
        message: format!("migrations directory is not valid UTF-8: {}", dir.display()),
    })?;
    let pattern = format!("{}/*.sql", glob::Pattern::escape(dir_str));
    let entries = glob::glob(&pattern).map_err(|e| MigrateError::StepLoad {
        message: format!("invalid migrations pattern {pattern}: {e}"),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| MigrateError::StepLoad {
            message: e.to_string(),
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Version from the leading digits of the file name.
fn parse_version(path: &Path) -> MigrateResult<u32> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
    let rest = &stem[digits.len()..];

    if digits.is_empty() || !(rest.is_empty() || rest.starts_with('_')) {
        return Err(MigrateError::StepLoad {
            message: format!(
                "{} must be named NNN_description.sql",
                path.display()
            ),
        });
    }
    let version = digits.parse::<u32>().map_err(|e| MigrateError::StepLoad {
        message: format!("{}: invalid version number: {e}", path.display()),
    })?;
    if version == 0 {
        return Err(MigrateError::StepLoad {
            message: format!("{}: versions start at 1", path.display()),
        });
    }
    Ok(version)
}

fn check_sequence(files: &[(u32, PathBuf)]) -> MigrateResult<()> {
    for (expected, (version, path)) in (1u32..).zip(files) {
        if *version == expected {
            continue;
        }
        let message = if *version < expected {
            format!("duplicate version {version}: {}", path.display())
        } else {
            format!(
                "version {expected} is missing (next file is {})",
                path.display()
            )
        };
        return Err(MigrateError::StepLoad { message });
    }
    Ok(())
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
