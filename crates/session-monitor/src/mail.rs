//! Report delivery over SMTP, or into the log when mail is not configured.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use session_core::error::NotifyError;
use session_core::traits::Notifier;
use std::time::Duration;
use tracing::{debug, info};

/// SMTP settings with credentials already resolved.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipient: String,
    pub timeout: Duration,
    pub subject_prefix: Option<String>,
}

/// Sends each notification as a plain-text mail through a STARTTLS relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    subject_prefix: Option<String>,
}

impl SmtpNotifier {
    /// Create a notifier. No connection is made until the first send.
    pub fn new(config: MailConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .sender
            .parse()
            .map_err(|e| NotifyError::Configuration(format!("sender address: {}", e)))?;
        let to: Mailbox = config
            .recipient
            .parse()
            .map_err(|e| NotifyError::Configuration(format!("recipient address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .map_err(|e| NotifyError::Configuration(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.sender.clone(), config.password))
            .timeout(Some(config.timeout))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            subject_prefix: config.subject_prefix,
        })
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message, NotifyError> {
        let subject = match &self.subject_prefix {
            Some(prefix) => format!("{} {}", prefix, subject),
            None => subject.to_string(),
        };

        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = self.build_message(subject, body)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }

    fn name(&self) -> &str {
        "SMTP"
    }
}

/// Writes notifications to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(subject, body, "Notification (mail disabled)");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
