//! Quote inspection command.

use anyhow::{Context, Result};
use chrono::Utc;
use session_config::AppConfig;
use session_core::traits::QuoteSource;
use session_data::YahooQuoteSource;
use session_engine::signal;

use crate::cli::QuoteArgs;

pub async fn run(args: QuoteArgs, config: &AppConfig) -> Result<()> {
    let trader_config = config.trader_config()?;
    let session = &trader_config.session;
    let source =
        YahooQuoteSource::new(config.quote_config()).context("Failed to create quote source")?;

    let now = Utc::now();
    let bars = source
        .completed_bars(
            &trader_config.symbol,
            trader_config.timeframe,
            trader_config.lookback,
            now,
        )
        .await
        .context("Failed to fetch bars")?;

    println!(
        "{} {} bars from {} ({} completed)",
        trader_config.symbol,
        trader_config.timeframe,
        source.name(),
        bars.len()
    );
    println!("───────────────────────────────────────────────────────────────────");

    let skip = bars.len().saturating_sub(args.count);
    for bar in bars.iter().skip(skip) {
        let start = bar
            .datetime()
            .map(|dt| session.local(dt).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| bar.timestamp.to_string());
        println!(
            "  {}  O {:>10.2}  H {:>10.2}  L {:>10.2}  C {:>10.2}  M {:>10.2}",
            start,
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.typical_price()
        );
    }
    println!();

    match bars.as_slice() {
        [.., prior, recent] => {
            let reading = signal::evaluate(prior, recent);
            println!(
                "Signal: {:?} (M {:.2} -> {:.2})",
                reading.signal, reading.prior_typical, reading.recent_typical
            );
        }
        _ => println!("Signal: not enough completed bars"),
    }

    println!(
        "Phase:  {} ({})",
        session.phase_at(now),
        session.local(now).format("%H:%M %Z")
    );

    Ok(())
}
