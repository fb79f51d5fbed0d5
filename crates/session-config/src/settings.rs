//! Configuration structures.

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use config::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use session_core::types::{Lookback, Timeframe};
use session_data::YahooConfig;
use session_engine::{Schedule, SessionHours, TraderConfig};
use session_monitor::MailConfig;
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub portfolio: PortfolioSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub quotes: QuoteSettings,
    #[serde(default)]
    pub mail: MailSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "session-trader".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Instrument and exchange session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub symbol: String,
    pub timezone: String,
    /// Session open, `HH:MM` exchange local time
    pub open: String,
    /// Session close, `HH:MM` exchange local time
    pub close: String,
    pub interval: Timeframe,
    pub lookback: Lookback,
    pub trading_days: Vec<Weekday>,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            symbol: "^GDAXI".to_string(),
            timezone: "Europe/Paris".to_string(),
            open: "09:30".to_string(),
            close: "17:30".to_string(),
            interval: Timeframe::Minute15,
            lookback: Lookback::Day1,
            trading_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
        }
    }
}

/// Simulated book settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioSettings {
    pub initial_capital: Decimal,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            initial_capital: dec!(1000000),
        }
    }
}

/// Loop cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub poll_interval_secs: u64,
    pub data_retry_secs: u64,
    pub fault_retry_secs: u64,
    pub liquidation_retries: u32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            data_retry_secs: 60,
            fault_retry_secs: 60,
            liquidation_retries: 5,
        }
    }
}

/// Quote source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Mail transport settings. Credentials are read from the named
/// environment variables, never from the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_env: String,
    pub password_env: String,
    pub recipient_env: String,
    pub timeout_secs: u64,
    pub subject_prefix: Option<String>,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender_env: "EMAIL_ADDRESS".to_string(),
            password_env: "EMAIL_PASSWORD".to_string(),
            recipient_env: "TO_EMAIL".to_string(),
            timeout_secs: 30,
            subject_prefix: None,
        }
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| ConfigError::Message(format!("market.{} '{}': {}", field, value, e)))
}

impl AppConfig {
    /// Check every setting that deserialization alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trader_config()?;

        if self.market.symbol.trim().is_empty() {
            return Err(ConfigError::Message("market.symbol must not be empty".into()));
        }
        if self.quotes.timeout_secs == 0 {
            return Err(ConfigError::Message("quotes.timeout_secs must be positive".into()));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Message(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Session hours in the configured exchange time zone.
    pub fn session_hours(&self) -> Result<SessionHours, ConfigError> {
        let timezone: Tz = self.market.timezone.parse().map_err(|e| {
            ConfigError::Message(format!("market.timezone '{}': {}", self.market.timezone, e))
        })?;
        let open = parse_time("open", &self.market.open)?;
        let close = parse_time("close", &self.market.close)?;

        SessionHours::with_trading_days(timezone, open, close, self.market.trading_days.clone())
            .map_err(|e| ConfigError::Message(e.to_string()))
    }

    /// Everything the trading loop needs.
    pub fn trader_config(&self) -> Result<TraderConfig, ConfigError> {
        if self.portfolio.initial_capital <= Decimal::ZERO {
            return Err(ConfigError::Message(
                "portfolio.initial_capital must be positive".into(),
            ));
        }

        let s = &self.schedule;
        if s.poll_interval_secs == 0 || s.data_retry_secs == 0 || s.fault_retry_secs == 0 {
            return Err(ConfigError::Message(
                "schedule intervals must be positive".into(),
            ));
        }

        Ok(TraderConfig {
            symbol: self.market.symbol.clone(),
            timeframe: self.market.interval,
            lookback: self.market.lookback,
            session: self.session_hours()?,
            initial_capital: self.portfolio.initial_capital,
            schedule: Schedule {
                poll_interval: Duration::from_secs(s.poll_interval_secs),
                data_retry: Duration::from_secs(s.data_retry_secs),
                fault_retry: Duration::from_secs(s.fault_retry_secs),
                liquidation_retries: s.liquidation_retries,
            },
        })
    }

    /// Quote source settings.
    pub fn quote_config(&self) -> YahooConfig {
        YahooConfig {
            base_url: self.quotes.base_url.clone(),
            timeout: Duration::from_secs(self.quotes.timeout_secs),
        }
    }

    /// Mail settings with credentials resolved from the process environment.
    ///
    /// `Ok(None)` means mail is disabled.
    pub fn mail_config(&self) -> Result<Option<MailConfig>, ConfigError> {
        self.mail_config_with(|name| std::env::var(name).ok())
    }

    /// Mail settings with credentials resolved through `lookup`.
    pub fn mail_config_with<F>(&self, lookup: F) -> Result<Option<MailConfig>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mail = &self.mail;
        if !mail.enabled {
            return Ok(None);
        }

        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::Message(format!("{} not set", name)))
        };

        Ok(Some(MailConfig {
            smtp_server: mail.smtp_server.clone(),
            smtp_port: mail.smtp_port,
            sender: require(&mail.sender_env)?,
            password: require(&mail.password_env)?,
            recipient: require(&mail.recipient_env)?,
            timeout: Duration::from_secs(mail.timeout_secs),
            subject_prefix: mail.subject_prefix.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use config::{Config, File, FileFormat};
    use rust_decimal_macros::dec;

    fn from_toml(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_describe_dax_session() {
        let config = from_toml("");
        let trader = config.trader_config().unwrap();

        assert_eq!(trader.symbol, "^GDAXI");
        assert_eq!(trader.timeframe, Timeframe::Minute15);
        assert_eq!(trader.initial_capital, dec!(1000000));
        assert_eq!(trader.session.timezone(), chrono_tz::Europe::Paris);
        assert_eq!(trader.session.open().hour(), 9);
        assert_eq!(trader.session.close().minute(), 30);
        assert_eq!(trader.schedule, Schedule::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides() {
        let config = from_toml(
            r#"
            [market]
            symbol = "^FCHI"
            timezone = "Europe/Paris"
            open = "09:00"
            close = "17:30"
            interval = "5m"
            lookback = "1d"
            trading_days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]

            [portfolio]
            initial_capital = 250000

            [schedule]
            poll_interval_secs = 30
            data_retry_secs = 15
            fault_retry_secs = 120
            liquidation_retries = 0
            "#,
        );
        let trader = config.trader_config().unwrap();

        assert_eq!(trader.symbol, "^FCHI");
        assert_eq!(trader.timeframe, Timeframe::Minute5);
        assert_eq!(trader.initial_capital, dec!(250000));
        assert!(trader.session.is_trading_day(Weekday::Sat));
        assert_eq!(trader.schedule.poll_interval, Duration::from_secs(30));
        assert_eq!(trader.schedule.fault_retry, Duration::from_secs(120));
        assert_eq!(trader.schedule.liquidation_retries, 0);
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        let mut config = AppConfig::default();
        config.market.timezone = "Mars/Olympus".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_close_before_open() {
        let mut config = AppConfig::default();
        config.market.open = "17:30".to_string();
        config.market.close = "09:30".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_time() {
        let mut config = AppConfig::default();
        config.market.open = "half past nine".to_string();

        assert!(config.session_hours().is_err());
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let mut config = AppConfig::default();
        config.schedule.poll_interval_secs = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mail_disabled_yields_none() {
        let config = AppConfig::default();
        assert!(config.mail_config_with(|_| None).unwrap().is_none());
    }

    #[test]
    fn test_mail_credentials_from_lookup() {
        let mut config = AppConfig::default();
        config.mail.enabled = true;

        let mail = config
            .mail_config_with(|name| match name {
                "EMAIL_ADDRESS" => Some("bot@example.com".to_string()),
                "EMAIL_PASSWORD" => Some("app-password".to_string()),
                "TO_EMAIL" => Some("desk@example.com".to_string()),
                _ => None,
            })
            .unwrap()
            .unwrap();

        assert_eq!(mail.smtp_server, "smtp.gmail.com");
        assert_eq!(mail.smtp_port, 587);
        assert_eq!(mail.sender, "bot@example.com");
        assert_eq!(mail.recipient, "desk@example.com");
    }

    #[test]
    fn test_mail_missing_credential_is_an_error() {
        let mut config = AppConfig::default();
        config.mail.enabled = true;

        let err = config
            .mail_config_with(|name| (name == "EMAIL_ADDRESS").then(|| "bot@example.com".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains("EMAIL_PASSWORD"));
    }
}
