//! OHLCV (Open, High, Low, Close, Volume) bar type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timeframe;

/// One sampling interval of an instrument.
///
/// `timestamp` marks the start of the interval; a bar is only complete
/// once its whole interval lies in the past.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Interval start as Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume (zero for indices that do not report one)
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Typical price: the mean of open, high, low and close.
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }

    /// Get the interval start as a DateTime.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Unix milliseconds at which the bar's interval ends.
    #[inline]
    pub fn end_millis(&self, timeframe: Timeframe) -> i64 {
        self.timestamp + timeframe.as_millis() as i64
    }

    /// Whether the bar's interval has fully elapsed at `now`.
    pub fn is_complete(&self, timeframe: Timeframe, now: DateTime<Utc>) -> bool {
        self.end_millis(timeframe) <= now.timestamp_millis()
    }

    /// Whether every price field is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite())
    }
}
