//! CLI command implementations.

pub mod quote;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use session_config::AppConfig;
use session_core::traits::Notifier;
use session_monitor::{LogNotifier, SmtpNotifier};
use tracing::{info, warn};

/// Mail when it is enabled and fully configured, the log otherwise.
pub fn build_notifier(config: &AppConfig) -> Result<Box<dyn Notifier>> {
    match config.mail_config() {
        Ok(Some(mail)) => {
            info!(server = %mail.smtp_server, port = mail.smtp_port, "Mail reports enabled");
            let notifier = SmtpNotifier::new(mail).context("Failed to set up mail transport")?;
            Ok(Box::new(notifier))
        }
        Ok(None) => {
            info!("Mail disabled, reports will only be logged");
            Ok(Box::new(LogNotifier))
        }
        Err(e) => {
            warn!(error = %e, "Mail credentials incomplete, reports will only be logged");
            Ok(Box::new(LogNotifier))
        }
    }
}
