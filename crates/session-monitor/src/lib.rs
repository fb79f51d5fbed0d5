//! Logging setup and report delivery.

mod logging;
mod mail;

pub use logging::{setup_logging, LogGuard};
pub use mail::{LogNotifier, MailConfig, SmtpNotifier};
