//! Alert delivery adapters
//!
//! - `TelegramNotifier`: Bot API `sendMessage`
//! - `DiscordNotifier`: webhook POST
//! - `LogNotifier`: tracing only, used when no channel is configured
//! - `MultiNotifier`: fan-out to several channels

mod discord;
mod telegram;

pub use discord::DiscordNotifier;
pub use telegram::TelegramNotifier;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AlertsSection;
use crate::domain::Instrument;
use crate::ports::{NotifierError, NotifierPort};

/// Writes alerts to the log instead of an external channel
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotifierPort for LogNotifier {
    async fn send(&self, message: &str, instrument: &Instrument) -> Result<(), NotifierError> {
        tracing::warn!("[alert] {} ({})", message, instrument);
        Ok(())
    }
}

/// Sends to every channel; fails only if all of them fail
pub struct MultiNotifier {
    channels: Vec<Arc<dyn NotifierPort>>,
}

impl MultiNotifier {
    pub fn new(channels: Vec<Arc<dyn NotifierPort>>) -> Self {
        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl NotifierPort for MultiNotifier {
    async fn send(&self, message: &str, instrument: &Instrument) -> Result<(), NotifierError> {
        let mut errors = Vec::new();
        for channel in &self.channels {
            if let Err(e) = channel.send(message, instrument).await {
                errors.push(e.to_string());
            }
        }

        if !self.channels.is_empty() && errors.len() == self.channels.len() {
            return Err(NotifierError::DeliveryFailed(errors.join("; ")));
        }
        for error in &errors {
            tracing::warn!("Alert channel failed: {}", error);
        }
        Ok(())
    }
}

/// Build the notifier for the configured alert channels
///
/// Falls back to `LogNotifier` when no channel is enabled or every enabled
/// channel is misconfigured.
pub fn notifier_from_alerts(alerts: &AlertsSection) -> Arc<dyn NotifierPort> {
    let mut channels: Vec<Arc<dyn NotifierPort>> = Vec::new();

    if alerts.telegram_enabled {
        match TelegramNotifier::new(
            &alerts.get_telegram_bot_token(),
            &alerts.get_telegram_chat_id(),
        ) {
            Ok(telegram) => channels.push(Arc::new(telegram)),
            Err(e) => tracing::warn!("Telegram alerts disabled: {}", e),
        }
    }

    if alerts.discord_enabled {
        match DiscordNotifier::new(&alerts.get_discord_webhook_url()) {
            Ok(discord) => channels.push(Arc::new(discord)),
            Err(e) => tracing::warn!("Discord alerts disabled: {}", e),
        }
    }

    match channels.len() {
        0 => Arc::new(LogNotifier),
        1 => channels.remove(0),
        _ => Arc::new(MultiNotifier::new(channels)),
    }
}
