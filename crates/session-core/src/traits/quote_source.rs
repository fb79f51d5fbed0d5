//! Quote source trait definition.

use crate::error::DataError;
use crate::types::{Bar, Lookback, Timeframe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for sources of recent intraday bars.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the completed bars of the lookback window.
    ///
    /// # Arguments
    /// * `symbol` - The instrument to fetch
    /// * `timeframe` - The bar interval
    /// * `lookback` - How far back to reach
    /// * `now` - The instant used to decide whether a bar is still in progress
    ///
    /// # Returns
    /// Completed bars ordered from oldest to newest. Bars whose interval has
    /// not elapsed at `now` are never included.
    async fn completed_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: Lookback,
        now: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError>;

    /// Fetch exactly the `count` most recent completed bars, oldest first.
    ///
    /// Fails with [`DataError::InsufficientData`] when fewer are available.
    async fn recent_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: Lookback,
        now: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<Bar>, DataError> {
        let mut bars = self.completed_bars(symbol, timeframe, lookback, now).await?;
        if bars.len() < count {
            return Err(DataError::InsufficientData {
                required: count,
                available: bars.len(),
            });
        }
        Ok(bars.split_off(bars.len() - count))
    }

    /// Get the source name.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Vec<Bar>);

    #[async_trait]
    impl QuoteSource for FixedSource {
        async fn completed_bars(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            _lookback: Lookback,
            _now: DateTime<Utc>,
        ) -> Result<Vec<Bar>, DataError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn bar(ts: i64) -> Bar {
        Bar::new(ts, 1.0, 1.0, 1.0, 1.0, 0.0)
    }

    #[tokio::test]
    async fn test_recent_bars_takes_tail() {
        let source = FixedSource(vec![bar(1), bar(2), bar(3)]);
        let bars = source
            .recent_bars("X", Timeframe::Minute15, Lookback::Day1, Utc::now(), 2)
            .await
            .unwrap();

        assert_eq!(bars.iter().map(|b| b.timestamp).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_recent_bars_insufficient() {
        let source = FixedSource(vec![bar(1)]);
        let err = source
            .recent_bars("X", Timeframe::Minute15, Lookback::Day1, Utc::now(), 2)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DataError::InsufficientData {
                required: 2,
                available: 1
            }
        ));
    }
}
