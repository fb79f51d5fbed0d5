//! Core traits for the session trader.

mod clock;
mod notifier;
mod quote_source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use notifier::Notifier;
pub use quote_source::QuoteSource;
