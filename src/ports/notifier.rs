use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::domain::Instrument;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Notifier not configured: {0}")]
    NotConfigured(String),
}

/// Human-readable alert channel
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotifierPort: Send + Sync {
    async fn send(&self, message: &str, instrument: &Instrument) -> Result<(), NotifierError>;
}
