//! Single-instrument simulated book.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use session_core::error::{TradingError, TradingResult};
use std::fmt;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A simulated execution and the book right after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub side: Side,
    pub quantity: u64,
    pub price: Decimal,
    pub cash_after: Decimal,
    pub position_after: u64,
}

/// Cash plus a non-negative unit count of the tracked instrument.
///
/// Every position change moves cash by the opposite amount at the same
/// price, so `cash + position * price` is unchanged by a trade at `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    cash: Decimal,
    position: u64,
    initial_capital: Decimal,
}

impl Portfolio {
    /// Create a flat portfolio holding `initial_capital` in cash.
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            cash: initial_capital,
            position: 0,
            initial_capital,
        }
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0
    }

    /// Buy exactly one unit at `price`. Cash may go negative.
    pub fn buy_one(&mut self, price: Decimal) -> Fill {
        self.cash -= price;
        self.position += 1;

        Fill {
            side: Side::Buy,
            quantity: 1,
            price,
            cash_after: self.cash,
            position_after: self.position,
        }
    }

    /// Sell the whole position at `price`. Returns `None` when already flat.
    pub fn liquidate(&mut self, price: Decimal) -> Option<Fill> {
        if self.is_flat() {
            return None;
        }

        let quantity = self.position;
        self.cash += Decimal::from(quantity) * price;
        self.position = 0;

        Some(Fill {
            side: Side::Sell,
            quantity,
            price,
            cash_after: self.cash,
            position_after: 0,
        })
    }

    /// Cash gained or lost against the initial capital.
    pub fn day_gain(&self) -> Decimal {
        self.cash - self.initial_capital
    }

    /// Cash plus the position marked at `price`.
    pub fn equity(&self, price: Decimal) -> Decimal {
        self.cash + Decimal::from(self.position) * price
    }
}

/// Convert a feed price into money, rejecting NaN and infinities.
pub fn price_from_f64(value: f64) -> TradingResult<Decimal> {
    if !value.is_finite() {
        return Err(TradingError::InvalidPrice(value));
    }
    Decimal::try_from(value).map_err(|_| TradingError::InvalidPrice(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_one_moves_cash_and_position_together() {
        let mut portfolio = Portfolio::new(dec!(1000000));

        let fill = portfolio.buy_one(dec!(102));

        assert_eq!(portfolio.cash(), dec!(999898));
        assert_eq!(portfolio.position(), 1);
        assert_eq!(fill.side, Side::Buy);
        assert_eq!(fill.quantity, 1);
        assert_eq!(fill.cash_after, dec!(999898));
    }

    #[test]
    fn test_trades_preserve_equity_at_trade_price() {
        let mut portfolio = Portfolio::new(dec!(1000000));
        portfolio.buy_one(dec!(100));
        portfolio.buy_one(dec!(101.5));

        let before = portfolio.equity(dec!(103.25));
        portfolio.buy_one(dec!(103.25));
        assert_eq!(portfolio.equity(dec!(103.25)), before);

        let before = portfolio.equity(dec!(99.75));
        let fill = portfolio.liquidate(dec!(99.75)).unwrap();
        assert_eq!(portfolio.equity(dec!(99.75)), before);
        assert_eq!(fill.quantity, 3);
        assert!(portfolio.is_flat());
    }

    #[test]
    fn test_liquidate_credits_whole_position() {
        let mut portfolio = Portfolio::new(dec!(1000000));
        portfolio.buy_one(dec!(102));

        let fill = portfolio.liquidate(dec!(105)).unwrap();

        assert_eq!(fill.side, Side::Sell);
        assert_eq!(portfolio.cash(), dec!(1000003));
        assert_eq!(portfolio.position(), 0);
        assert_eq!(portfolio.day_gain(), dec!(3));
    }

    #[test]
    fn test_liquidate_when_flat_is_noop() {
        let mut portfolio = Portfolio::new(dec!(500));
        assert!(portfolio.liquidate(dec!(10)).is_none());
        assert_eq!(portfolio.cash(), dec!(500));
    }

    #[test]
    fn test_cash_may_go_negative() {
        let mut portfolio = Portfolio::new(dec!(50));
        portfolio.buy_one(dec!(80));
        assert_eq!(portfolio.cash(), dec!(-30));
    }

    #[test]
    fn test_price_from_f64() {
        assert_eq!(price_from_f64(102.0).unwrap(), dec!(102));
        assert_eq!(price_from_f64(17_912.25).unwrap(), dec!(17912.25));
        assert!(matches!(
            price_from_f64(f64::NAN),
            Err(TradingError::InvalidPrice(_))
        ));
        assert!(price_from_f64(f64::INFINITY).is_err());
    }
}
