//! Typical-price momentum signal on two consecutive completed bars.
//!
//! Buys one unit when the most recent bar's typical price is strictly above
//! the previous bar's. There is no intraday sell: the book is only reduced
//! by the liquidation at the close.

use serde::{Deserialize, Serialize};
use session_core::types::Bar;

/// Action suggested for the current poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Hold,
}

/// Inputs and result of one evaluation, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalReading {
    pub prior_typical: f64,
    pub recent_typical: f64,
    pub signal: Signal,
}

/// Compare the typical prices of `prior` and `recent`.
pub fn evaluate(prior: &Bar, recent: &Bar) -> SignalReading {
    let prior_typical = prior.typical_price();
    let recent_typical = recent.typical_price();

    let signal = if recent_typical > prior_typical {
        Signal::Buy
    } else {
        Signal::Hold
    };

    SignalReading {
        prior_typical,
        recent_typical,
        signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_typical_price_buys() {
        let prior = Bar::new(0, 100.0, 102.0, 99.0, 101.0, 0.0);
        let recent = Bar::new(900_000, 101.0, 103.0, 100.0, 102.0, 0.0);

        let reading = evaluate(&prior, &recent);

        assert_eq!(reading.signal, Signal::Buy);
        assert!((reading.prior_typical - 100.5).abs() < 1e-9);
        assert!((reading.recent_typical - 101.5).abs() < 1e-9);
    }

    #[test]
    fn test_equal_typical_price_holds() {
        // Different bars, same OHLC mean
        let prior = Bar::new(0, 100.0, 104.0, 98.0, 102.0, 0.0);
        let recent = Bar::new(900_000, 101.0, 103.0, 99.0, 101.0, 0.0);

        assert_eq!(evaluate(&prior, &recent).signal, Signal::Hold);
    }

    #[test]
    fn test_falling_typical_price_holds() {
        let prior = Bar::new(0, 101.0, 103.0, 100.0, 102.0, 0.0);
        let recent = Bar::new(900_000, 100.0, 102.0, 99.0, 101.0, 0.0);

        assert_eq!(evaluate(&prior, &recent).signal, Signal::Hold);
    }

    #[test]
    fn test_nan_never_buys() {
        let prior = Bar::new(0, 100.0, 102.0, 99.0, 101.0, 0.0);
        let recent = Bar::new(900_000, f64::NAN, 103.0, 100.0, 102.0, 0.0);

        assert_eq!(evaluate(&prior, &recent).signal, Signal::Hold);
    }
}
