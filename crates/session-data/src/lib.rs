//! Quote sources for the session trader.

mod yahoo;

pub use yahoo::{YahooConfig, YahooQuoteSource};
