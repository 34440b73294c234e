use clap::Parser;
use eyre::{Context, Result};
use log::info;

mod cli;
mod commands;

use cli::{Cli, Commands, LogLevel};

fn setup_logging(log_level: &LogLevel) {
    // RUST_LOG env var takes precedence, otherwise use --log-level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.as_filter());
    }

    builder.target(env_logger::Target::Stderr).init();

    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "flag" }
    );
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli.log_level);

    run(cli).context("Command failed")?;

    Ok(())
}
