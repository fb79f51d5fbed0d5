//! Validate configuration command.

use anyhow::Result;
use session_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Symbol: {}", config.market.symbol);
            println!(
                "Session: {}-{} {} ({:?})",
                config.market.open,
                config.market.close,
                config.market.timezone,
                config.market.trading_days
            );
            println!(
                "Bars: {} over {}",
                config.market.interval, config.market.lookback
            );
            println!("Initial capital: {}", config.portfolio.initial_capital);
            println!("Poll interval: {}s", config.schedule.poll_interval_secs);
            match config.mail_config() {
                Ok(Some(mail)) => println!(
                    "Mail: {}:{} -> {}",
                    mail.smtp_server, mail.smtp_port, mail.recipient
                ),
                Ok(None) => println!("Mail: disabled"),
                Err(e) => println!("Mail: enabled but {} (reports will only be logged)", e),
            }
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
