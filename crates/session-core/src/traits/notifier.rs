//! Notifier trait definition.

use crate::error::NotifyError;
use async_trait::async_trait;

/// Delivers a subject and body to a recipient configured out of band.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message. Callers decide what a failure means; the trading
    /// loop only logs it.
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError>;

    /// Get the notifier name.
    fn name(&self) -> &str;
}
