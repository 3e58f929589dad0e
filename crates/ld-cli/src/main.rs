//! Ladder CLI - apply versioned schema updates to a database

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{init, status, up};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Init(args) => init::execute(args),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
        cli::Commands::Up(args) => up::execute(args, &cli.global),
    }
}

/// Route `log` records to stderr. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
