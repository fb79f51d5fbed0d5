//! Trading loop command implementation.

use anyhow::{Context, Result};
use session_config::AppConfig;
use session_core::traits::SystemClock;
use session_data::YahooQuoteSource;
use session_engine::SessionTrader;
use std::sync::Arc;
use tracing::info;

use super::build_notifier;

pub async fn run(config: &AppConfig) -> Result<()> {
    let trader_config = config.trader_config()?;

    info!(
        app = %config.app.name,
        environment = %config.app.environment,
        symbol = %trader_config.symbol,
        timezone = %trader_config.session.timezone(),
        open = %trader_config.session.open(),
        close = %trader_config.session.close(),
        "Starting session trader"
    );

    let quotes =
        YahooQuoteSource::new(config.quote_config()).context("Failed to create quote source")?;
    let notifier = build_notifier(config)?;

    let mut trader = SessionTrader::new(
        trader_config,
        Box::new(quotes),
        notifier,
        Arc::new(SystemClock),
    );
    trader.run().await;

    Ok(())
}
