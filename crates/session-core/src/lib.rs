//! Core types and traits for the session trader.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, Timeframe, Lookback)
//! - Error types shared by every crate in the workspace
//! - The seams the trading loop is driven through: quote sources,
//!   notifiers and clocks

pub mod types;
pub mod traits;
pub mod error;

pub use error::{TradingError, TradingResult};
pub use types::*;
pub use traits::*;
