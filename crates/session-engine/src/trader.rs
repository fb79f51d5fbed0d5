//! The polling loop that drives one trading day after another.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use session_core::error::{TradingError, TradingResult};
use session_core::traits::{Clock, Notifier, QuoteSource};
use session_core::types::{Lookback, Timeframe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::portfolio::{price_from_f64, Fill, Portfolio};
use crate::report::{self, Notification, ReportMarker};
use crate::session::{Phase, SessionHours};
use crate::signal::{self, Signal, SignalReading};

/// How long the loop sleeps after each kind of iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Pause between session polls
    pub poll_interval: Duration,
    /// Pause after the quote source could not supply enough bars
    pub data_retry: Duration,
    /// Pause after an iteration failed
    pub fault_retry: Duration,
    /// Extra post-close attempts to find a closing price before giving up
    /// for the day
    pub liquidation_retries: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            data_retry: Duration::from_secs(60),
            fault_retry: Duration::from_secs(60),
            liquidation_retries: 5,
        }
    }
}

/// Static inputs of the loop.
#[derive(Debug, Clone)]
pub struct TraderConfig {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub lookback: Lookback,
    pub session: SessionHours,
    pub initial_capital: Decimal,
    pub schedule: Schedule,
}

/// Everything the loop mutates. Lives in memory only.
#[derive(Debug, Clone, PartialEq)]
pub struct TraderState {
    pub portfolio: Portfolio,
    pub report_marker: ReportMarker,
    pub liquidation_attempts: u32,
    pub last_phase: Option<Phase>,
}

impl TraderState {
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            portfolio: Portfolio::new(initial_capital),
            report_marker: ReportMarker::default(),
            liquidation_attempts: 0,
            last_phase: None,
        }
    }
}

/// Outcome of one pass through the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Iteration {
    /// Before the session: wait for the open
    PreOpen { resume_at: DateTime<Tz> },
    /// After the session: the book was flattened (or already flat, or the
    /// closing price never arrived) and the loop waits for the next open
    Closed {
        liquidation: Option<Fill>,
        resume_at: DateTime<Tz>,
    },
    /// After the session with a position but no closing bar yet
    LiquidationDeferred { attempt: u32 },
    /// In session: the signal was evaluated
    Evaluated {
        reading: SignalReading,
        fill: Option<Fill>,
        reported: bool,
    },
    /// In session: not enough completed bars to evaluate
    InsufficientData,
}

/// Owns the book and drives the quote source, notifier and clock.
pub struct SessionTrader {
    config: TraderConfig,
    state: TraderState,
    quotes: Box<dyn QuoteSource>,
    notifier: Box<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl SessionTrader {
    /// Create a trader with a flat book holding the initial capital.
    pub fn new(
        config: TraderConfig,
        quotes: Box<dyn QuoteSource>,
        notifier: Box<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = TraderState::new(config.initial_capital);
        Self {
            config,
            state,
            quotes,
            notifier,
            clock,
        }
    }

    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    pub fn state(&self) -> &TraderState {
        &self.state
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.state.portfolio
    }

    /// Run forever. Every failure is logged and retried after a backoff.
    pub async fn run(&mut self) {
        info!(
            symbol = %self.config.symbol,
            quotes = self.quotes.name(),
            notifier = self.notifier.name(),
            capital = %self.config.initial_capital,
            "Session trader started"
        );
        loop {
            // tick logs failures and applies the backoff itself
            self.tick().await.ok();
        }
    }

    /// One iteration followed by the sleep it calls for.
    pub async fn tick(&mut self) -> TradingResult<Iteration> {
        let outcome = self.step().await;
        let wait = self.wait_after(&outcome, self.clock.now());

        match &outcome {
            Ok(Iteration::PreOpen { resume_at }) | Ok(Iteration::Closed { resume_at, .. }) => {
                info!(resume_at = %resume_at, "Waiting for next session open");
            }
            Ok(_) => debug!(wait_secs = wait.as_secs(), "Sleeping until next poll"),
            Err(e) => error!(
                error = %e,
                retry_in_secs = wait.as_secs(),
                "Unexpected error in trading iteration"
            ),
        }

        self.clock.sleep(wait).await;
        outcome
    }

    /// Evaluate the current phase and act on it, without sleeping.
    pub async fn step(&mut self) -> TradingResult<Iteration> {
        let now = self.clock.now();
        let phase = self.config.session.phase_at(now);

        if self.state.last_phase != Some(phase) {
            info!(
                from = ?self.state.last_phase,
                to = %phase,
                local_time = %self.config.session.local(now).format("%Y-%m-%d %H:%M:%S %Z"),
                "Session phase changed"
            );
            self.state.last_phase = Some(phase);
        }

        match phase {
            Phase::PreOpen => Ok(Iteration::PreOpen {
                resume_at: self.config.session.next_open_after(now),
            }),
            Phase::Open => self.evaluate_session(now).await,
            Phase::PostClose => self.close_session(now).await,
        }
    }

    /// How long to sleep after `outcome`, measured from `now`.
    pub fn wait_after(&self, outcome: &TradingResult<Iteration>, now: DateTime<Utc>) -> Duration {
        let schedule = &self.config.schedule;
        match outcome {
            Ok(Iteration::PreOpen { resume_at }) | Ok(Iteration::Closed { resume_at, .. }) => {
                (resume_at.with_timezone(&Utc) - now)
                    .to_std()
                    .unwrap_or(Duration::ZERO)
            }
            Ok(Iteration::Evaluated { .. }) => schedule.poll_interval,
            Ok(Iteration::InsufficientData) | Ok(Iteration::LiquidationDeferred { .. }) => {
                schedule.data_retry
            }
            Err(_) => schedule.fault_retry,
        }
    }

    async fn evaluate_session(&mut self, now: DateTime<Utc>) -> TradingResult<Iteration> {
        self.state.liquidation_attempts = 0;

        let bars = match self
            .quotes
            .recent_bars(
                &self.config.symbol,
                self.config.timeframe,
                self.config.lookback,
                now,
                2,
            )
            .await
        {
            Ok(bars) => bars,
            Err(e) => {
                warn!(symbol = %self.config.symbol, error = %e, "Not enough data, skipping iteration");
                return Ok(Iteration::InsufficientData);
            }
        };

        let [prior, recent] = bars.as_slice() else {
            return Err(TradingError::Internal(format!(
                "quote source returned {} bars where 2 were requested",
                bars.len()
            )));
        };

        let reading = signal::evaluate(prior, recent);
        let fill = match reading.signal {
            Signal::Buy => {
                let price = price_from_f64(recent.close)?;
                let fill = self.state.portfolio.buy_one(price);
                info!(
                    symbol = %self.config.symbol,
                    side = %fill.side,
                    price = %fill.price,
                    prior_typical = reading.prior_typical,
                    recent_typical = reading.recent_typical,
                    cash = %fill.cash_after,
                    position = fill.position_after,
                    "Bought one unit"
                );
                Some(fill)
            }
            Signal::Hold => {
                debug!(
                    prior_typical = reading.prior_typical,
                    recent_typical = reading.recent_typical,
                    "No signal"
                );
                None
            }
        };

        let local = self.config.session.local(now);
        let reported = if self.state.report_marker.claim(local) {
            let message = report::hourly_report(&self.config.symbol, local, &self.state.portfolio);
            info!(
                cash = %self.state.portfolio.cash(),
                position = self.state.portfolio.position(),
                "Hourly report"
            );
            self.deliver(&message).await;
            true
        } else {
            false
        };

        Ok(Iteration::Evaluated {
            reading,
            fill,
            reported,
        })
    }

    async fn close_session(&mut self, now: DateTime<Utc>) -> TradingResult<Iteration> {
        let resume_at = self.config.session.next_open_after(now);

        if self.state.portfolio.is_flat() {
            self.state.liquidation_attempts = 0;
            return Ok(Iteration::Closed {
                liquidation: None,
                resume_at,
            });
        }

        let bar = match self
            .quotes
            .recent_bars(
                &self.config.symbol,
                self.config.timeframe,
                self.config.lookback,
                now,
                1,
            )
            .await
        {
            Ok(bars) => bars.last().copied(),
            Err(e) => {
                debug!(error = %e, "No closing bar available");
                None
            }
        };

        let Some(bar) = bar else {
            self.state.liquidation_attempts += 1;
            let attempt = self.state.liquidation_attempts;
            if attempt > self.config.schedule.liquidation_retries {
                warn!(
                    position = self.state.portfolio.position(),
                    attempts = attempt,
                    "No closing price found, carrying position to next session"
                );
                self.state.liquidation_attempts = 0;
                return Ok(Iteration::Closed {
                    liquidation: None,
                    resume_at,
                });
            }
            return Ok(Iteration::LiquidationDeferred { attempt });
        };

        let price = price_from_f64(bar.close)?;
        let fill = self.state.portfolio.liquidate(price);
        self.state.liquidation_attempts = 0;

        info!(
            symbol = %self.config.symbol,
            price = %price,
            cash = %self.state.portfolio.cash(),
            day_gain = %report::signed_amount(self.state.portfolio.day_gain()),
            "End of session: positions closed"
        );
        let message = report::closing_report(&self.config.symbol, &self.state.portfolio);
        self.deliver(&message).await;

        Ok(Iteration::Closed {
            liquidation: fill,
            resume_at,
        })
    }

    async fn deliver(&self, message: &Notification) {
        match self.notifier.notify(&message.subject, &message.body).await {
            Ok(()) => info!(subject = %message.subject, "Notification sent"),
            Err(e) => error!(subject = %message.subject, error = %e, "Failed to send notification"),
        }
    }
}
