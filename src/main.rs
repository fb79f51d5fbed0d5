//! Session trader CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use session_config::load_config;
use session_monitor::setup_logging;
use std::path::Path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Credentials live in .env; a missing file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    let config = match command {
        Commands::ValidateConfig => return cli::commands::validate::run(&cli.config).await,
        _ => load_config(&cli.config).with_context(|| {
            format!("Failed to load configuration from {}", cli.config.display())
        })?,
    };

    // Setup logging
    let log_level = cli
        .log_level
        .map(|l| l.as_str())
        .unwrap_or(config.logging.level.as_str());
    let json = cli.json_logs || config.logging.format == "json";
    let _log_guard = setup_logging(log_level, json, config.logging.file.as_deref().map(Path::new));

    // Execute command
    match command {
        Commands::Run => cli::commands::run::run(&config).await,
        Commands::Quote(args) => cli::commands::quote::run(args, &config).await,
        Commands::NotifyTest => cli::commands::notify_test::run(&config).await,
        // Returned before the configuration was loaded
        Commands::ValidateConfig => Ok(()),
    }
}
