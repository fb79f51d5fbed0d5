//! Hourly and closing report messages.

use chrono::{DateTime, NaiveDate, Timelike};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::Portfolio;

/// A message ready for a notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Remembers the local date and hour that were last reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportMarker {
    last: Option<(NaiveDate, u32)>,
}

impl ReportMarker {
    pub fn last_claimed(&self) -> Option<(NaiveDate, u32)> {
        self.last
    }

    /// Returns true, and records the slot, if no report was sent for the
    /// hour of `local` on its date yet.
    pub fn claim(&mut self, local: DateTime<Tz>) -> bool {
        let slot = (local.date_naive(), local.hour());
        if self.last == Some(slot) {
            return false;
        }
        self.last = Some(slot);
        true
    }
}

/// Amount with an explicit sign and two decimals, e.g. `+3.00`.
pub fn signed_amount(value: Decimal) -> String {
    format!("{:+.2}", value.round_dp(2))
}

/// Status report sent once per hour during the session.
pub fn hourly_report(symbol: &str, local: DateTime<Tz>, portfolio: &Portfolio) -> Notification {
    Notification {
        subject: format!("{} hourly report", symbol),
        body: format!(
            "Time: {:02}:{:02}\nCash: {:.2}\nPosition: {}",
            local.hour(),
            local.minute(),
            portfolio.cash().round_dp(2),
            portfolio.position()
        ),
    }
}

/// Report sent after the end-of-day liquidation.
pub fn closing_report(symbol: &str, portfolio: &Portfolio) -> Notification {
    Notification {
        subject: format!("{} session close", symbol),
        body: format!(
            "Positions closed.\nCash: {:.2}\nDay gain: {}\nPosition: {}",
            portfolio.cash().round_dp(2),
            signed_amount(portfolio.day_gain()),
            portfolio.position()
        ),
    }
}
