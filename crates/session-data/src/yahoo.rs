//! Yahoo Finance chart API quote source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use session_core::error::DataError;
use session_core::traits::QuoteSource;
use session_core::types::{Bar, Lookback, Timeframe};
use std::time::Duration;
use tracing::debug;

/// Yahoo chart API configuration.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Quote source reading intraday bars from the Yahoo Finance chart endpoint.
pub struct YahooQuoteSource {
    config: YahooConfig,
    client: Client,
}

impl YahooQuoteSource {
    /// Create a new Yahoo quote source.
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("session-trader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, DataError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| DataError::ApiError(format!("invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DataError::ApiError("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }
}

/// Turn a chart payload into completed bars, oldest first.
///
/// Rows with a missing price are dropped, as is any bar whose interval has
/// not elapsed at `now`.
fn parse_chart(
    body: &str,
    symbol: &str,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Result<Vec<Bar>, DataError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| DataError::ParseError(e.to_string()))?;

    if let Some(err) = response.chart.error {
        return Err(if err.code == "Not Found" {
            DataError::SymbolNotFound(symbol.to_string())
        } else {
            DataError::ApiError(format!("{}: {}", err.code, err.description))
        });
    }

    let result = response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or(DataError::NoDataAvailable)?;

    let Some(columns) = result.indicators.quote.first() else {
        return Err(DataError::NoDataAvailable);
    };

    fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
        column.get(i).copied().flatten()
    }

    let mut bars: Vec<Bar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let bar = Bar::new(
                ts * 1000,
                cell(&columns.open, i)?,
                cell(&columns.high, i)?,
                cell(&columns.low, i)?,
                cell(&columns.close, i)?,
                cell(&columns.volume, i).unwrap_or(0.0),
            );
            Some(bar)
        })
        .filter(|bar| bar.is_complete(timeframe, now))
        .collect();

    bars.sort_by_key(|b| b.timestamp);

    debug!(
        symbol,
        rows = result.timestamp.len(),
        completed = bars.len(),
        "Parsed chart response"
    );

    Ok(bars)
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    async fn completed_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: Lookback,
        now: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let url = self.chart_url(symbol)?;

        let resp = self
            .client
            .get(url)
            .query(&[
                ("interval", timeframe.to_string()),
                ("range", lookback.to_string()),
            ])
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(DataError::ApiError(format!("{}: {}", status, text)));
        }

        parse_chart(&text, symbol, timeframe, now)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Three 15m bars starting 08:30, 08:45 and 09:00 UTC on 2024-03-04,
    // the middle one with a missing close.
    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "^GDAXI"},
                "timestamp": [1709541000, 1709541900, 1709542800],
                "indicators": {
                    "quote": [{
                        "open":   [100.0, 101.0, 102.0],
                        "high":   [102.0, 103.0, 104.0],
                        "low":    [99.0, 100.0, 101.0],
                        "close":  [101.0, null, 103.0],
                        "volume": [0, 0, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_drops_incomplete_and_missing_rows() {
        // 09:10 UTC: the 09:00 bar is still in progress.
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 9, 10, 0).unwrap();
        let bars = parse_chart(CHART, "^GDAXI", Timeframe::Minute15, now).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].timestamp, 1_709_541_000_000);
        assert_eq!(bars[0].close, 101.0);
    }

    #[test]
    fn test_parse_chart_keeps_bar_once_interval_elapsed() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 9, 15, 0).unwrap();
        let bars = parse_chart(CHART, "^GDAXI", Timeframe::Minute15, now).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 103.0);
        assert_eq!(bars[1].volume, 0.0);
    }

    #[test]
    fn test_parse_chart_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart(body, "^NOPE", Timeframe::Minute15, Utc::now()).unwrap_err();

        assert!(matches!(err, DataError::SymbolNotFound(s) if s == "^NOPE"));
    }

    #[test]
    fn test_parse_chart_empty_result() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        let err = parse_chart(body, "^GDAXI", Timeframe::Minute15, Utc::now()).unwrap_err();

        assert!(matches!(err, DataError::NoDataAvailable));
    }

    #[test]
    fn test_chart_url_places_symbol_in_one_segment() {
        let source = YahooQuoteSource::new(YahooConfig::default()).unwrap();

        assert_eq!(
            source.chart_url("^GDAXI").unwrap().path(),
            "/v8/finance/chart/^GDAXI"
        );
        assert_eq!(
            source.chart_url("BRK/B X").unwrap().as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/BRK%2FB%20X"
        );
    }

    #[test]
    fn test_chart_url_tolerates_trailing_slash() {
        let source = YahooQuoteSource::new(YahooConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..YahooConfig::default()
        })
        .unwrap();

        assert_eq!(
            source.chart_url("^GDAXI").unwrap().path(),
            "/v8/finance/chart/^GDAXI"
        );
    }
}
