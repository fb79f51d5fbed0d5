//! Trading-day state machine.
//!
//! Classifies the exchange day into phases, evaluates the typical-price
//! signal on completed bars, keeps the single-instrument book and decides
//! when to report and how long to sleep.

pub mod portfolio;
pub mod report;
pub mod session;
pub mod signal;
pub mod trader;

pub use portfolio::{price_from_f64, Fill, Portfolio, Side};
pub use report::{Notification, ReportMarker};
pub use session::{Phase, SessionHours};
pub use signal::{Signal, SignalReading};
pub use trader::{Iteration, Schedule, SessionTrader, TraderConfig, TraderState};
