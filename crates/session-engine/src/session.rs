//! Exchange session hours and phase classification.

use chrono::{DateTime, Datelike, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use session_core::error::TradingError;
use std::fmt;

/// Where an instant falls in the exchange day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Before the open, or any time on a non-trading day
    PreOpen,
    /// Regular session: `open <= t < close`
    Open,
    /// At or after the close
    PostClose,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::PreOpen => "pre-open",
            Phase::Open => "open",
            Phase::PostClose => "post-close",
        };
        write!(f, "{}", s)
    }
}

/// Regular session window in exchange local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHours {
    timezone: Tz,
    open: NaiveTime,
    close: NaiveTime,
    trading_days: Vec<Weekday>,
}

impl SessionHours {
    /// Create session hours trading Monday to Friday.
    pub fn new(timezone: Tz, open: NaiveTime, close: NaiveTime) -> Result<Self, TradingError> {
        Self::with_trading_days(
            timezone,
            open,
            close,
            vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
        )
    }

    /// Create session hours with an explicit set of trading weekdays.
    pub fn with_trading_days(
        timezone: Tz,
        open: NaiveTime,
        close: NaiveTime,
        trading_days: Vec<Weekday>,
    ) -> Result<Self, TradingError> {
        if open >= close {
            return Err(TradingError::Config(format!(
                "session open {} must be before close {}",
                open, close
            )));
        }
        if trading_days.is_empty() {
            return Err(TradingError::Config(
                "at least one trading day is required".into(),
            ));
        }
        Ok(Self {
            timezone,
            open,
            close,
            trading_days,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    pub fn trading_days(&self) -> &[Weekday] {
        &self.trading_days
    }

    /// Whether the exchange trades on `day`.
    pub fn is_trading_day(&self, day: Weekday) -> bool {
        self.trading_days.contains(&day)
    }

    /// Convert an instant to exchange local time.
    pub fn local(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        now.with_timezone(&self.timezone)
    }

    /// Classify a local time of day on a trading day.
    ///
    /// The open instant itself is `Open`; the close instant itself is
    /// `PostClose`.
    pub fn classify(&self, time: NaiveTime) -> Phase {
        if time < self.open {
            Phase::PreOpen
        } else if time < self.close {
            Phase::Open
        } else {
            Phase::PostClose
        }
    }

    /// Classify an instant, taking the trading calendar into account.
    pub fn phase_at(&self, now: DateTime<Utc>) -> Phase {
        let local = self.local(now);
        if !self.is_trading_day(local.weekday()) {
            return Phase::PreOpen;
        }
        self.classify(local.time())
    }

    /// The first session open strictly after `now`.
    pub fn next_open_after(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        let local = self.local(now);
        let mut date = local.date_naive();

        // A week always contains a configured trading day; the extra day
        // covers an open that falls into a DST gap.
        for _ in 0..8 {
            if self.is_trading_day(date.weekday()) {
                if let Some(open) = self
                    .timezone
                    .from_local_datetime(&date.and_time(self.open))
                    .earliest()
                {
                    if open > local {
                        return open;
                    }
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        local + TimeDelta::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Paris;

    fn hours() -> SessionHours {
        SessionHours::new(
            Paris,
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
        )
        .unwrap()
    }

    /// Paris wall-clock on 2024-03-04 (a Monday) plus `day_offset` days.
    fn paris(day_offset: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Paris
            .with_ymd_and_hms(2024, 3, 4 + day_offset, h, m, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_open_boundary_is_open() {
        let hours = hours();
        assert_eq!(hours.phase_at(paris(0, 9, 29, 59)), Phase::PreOpen);
        assert_eq!(hours.phase_at(paris(0, 9, 30, 0)), Phase::Open);
    }

    #[test]
    fn test_close_boundary_is_post_close() {
        let hours = hours();
        assert_eq!(hours.phase_at(paris(0, 17, 29, 59)), Phase::Open);
        assert_eq!(hours.phase_at(paris(0, 17, 30, 0)), Phase::PostClose);
        assert_eq!(hours.phase_at(paris(0, 23, 59, 0)), Phase::PostClose);
    }

    #[test]
    fn test_weekend_is_pre_open() {
        let hours = hours();
        // 2024-03-09 is a Saturday
        assert_eq!(hours.phase_at(paris(5, 11, 0, 0)), Phase::PreOpen);
    }

    #[test]
    fn test_seven_day_calendar_trades_weekends() {
        let hours = SessionHours::with_trading_days(
            Paris,
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
        )
        .unwrap();
        assert_eq!(hours.phase_at(paris(5, 11, 0, 0)), Phase::Open);
    }

    #[test]
    fn test_next_open_same_day_before_open() {
        let next = hours().next_open_after(paris(0, 7, 0, 0));
        assert_eq!(next.with_timezone(&Utc), paris(0, 9, 30, 0));
    }

    #[test]
    fn test_next_open_after_close_is_next_morning() {
        let next = hours().next_open_after(paris(0, 17, 30, 0));
        assert_eq!(next.with_timezone(&Utc), paris(1, 9, 30, 0));
    }

    #[test]
    fn test_next_open_at_open_instant_is_tomorrow() {
        let next = hours().next_open_after(paris(0, 9, 30, 0));
        assert_eq!(next.with_timezone(&Utc), paris(1, 9, 30, 0));
    }

    #[test]
    fn test_next_open_skips_weekend() {
        // Friday 2024-03-08 evening resumes Monday 2024-03-11
        let next = hours().next_open_after(paris(4, 18, 0, 0));
        assert_eq!(next.with_timezone(&Utc), paris(7, 9, 30, 0));
    }

    #[test]
    fn test_next_open_across_dst_change() {
        // Clocks go forward on Sunday 2024-03-31; Monday's open is 07:30 UTC.
        let friday_evening = Paris
            .with_ymd_and_hms(2024, 3, 29, 18, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let next = hours().next_open_after(friday_evening);

        assert_eq!(
            next.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 4, 1, 7, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_inverted_session() {
        let result = SessionHours::new(
            Paris,
            NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        );
        assert!(matches!(result, Err(TradingError::Config(_))));
    }
}
