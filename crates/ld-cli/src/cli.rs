//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Ladder - bring a database schema up to the latest version
#[derive(Parser, Debug)]
#[command(name = "ladder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override target (database connection)
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new Ladder project
    Init(InitArgs),

    /// Show current, latest, and pending versions
    Status(StatusArgs),

    /// Apply all pending update steps
    Up(UpArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name (also the directory to create)
    pub name: String,

    /// Database engine
    #[arg(long, value_enum, default_value = "duckdb")]
    pub db_type: DbTypeArg,

    /// Database file path written to ladder.yml [default: app.duckdb or app.db]
    #[arg(long)]
    pub database_path: Option<String>,
}

impl InitArgs {
    /// The database path, defaulting to a file named for the engine
    pub fn database_path(&self) -> &str {
        self.database_path
            .as_deref()
            .unwrap_or_else(|| self.db_type.default_path())
    }
}

/// Database engine choices for `init`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbTypeArg {
    /// DuckDB
    Duckdb,
    /// SQLite
    Sqlite,
}

impl DbTypeArg {
    pub fn as_str(self) -> &'static str {
        match self {
            DbTypeArg::Duckdb => "duckdb",
            DbTypeArg::Sqlite => "sqlite",
        }
    }

    pub fn default_path(self) -> &'static str {
        match self {
            DbTypeArg::Duckdb => "app.duckdb",
            DbTypeArg::Sqlite => "app.db",
        }
    }
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the up command
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Run steps without wrapping them in transactions
    #[arg(long)]
    pub no_transactions: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
