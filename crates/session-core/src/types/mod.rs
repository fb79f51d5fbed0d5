//! Core data types for the session trader.

mod ohlcv;
mod timeframe;

pub use ohlcv::Bar;
pub use timeframe::{Lookback, Timeframe};
