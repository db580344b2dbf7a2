//! Discord webhook notifier

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::domain::Instrument;
use crate::ports::{NotifierError, NotifierPort};

#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    http: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: &str) -> Result<Self, NotifierError> {
        if !webhook_url.starts_with("https://") {
            return Err(NotifierError::NotConfigured(
                "Discord webhook URL must be https".into(),
            ));
        }

        Ok(Self {
            http: Client::new(),
            webhook_url: webhook_url.to_string(),
        })
    }

    fn payload(message: &str, instrument: &Instrument) -> serde_json::Value {
        json!({
            "username": "sniper-signals",
            "embeds": [{
                "title": "Sell signal",
                "description": message,
                "fields": [{ "name": "Token", "value": instrument.as_str() }],
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }]
        })
    }
}

#[async_trait]
impl NotifierPort for DiscordNotifier {
    async fn send(&self, message: &str, instrument: &Instrument) -> Result<(), NotifierError> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&Self::payload(message, instrument))
            .send()
            .await
            .map_err(|e| NotifierError::DeliveryFailed(format!("Discord request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(NotifierError::DeliveryFailed(format!(
                "Discord webhook returned {}",
                response.status()
            )));
        }

        tracing::debug!("Sent Discord alert for {}", instrument.short());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_https() {
        assert!(DiscordNotifier::new("http://discord.com/api/webhooks/1/x").is_err());
        assert!(DiscordNotifier::new("https://discord.com/api/webhooks/1/x").is_ok());
    }

    #[test]
    fn test_payload_names_instrument() {
        let payload = DiscordNotifier::payload("No sell signal", &Instrument::from("MINT"));
        assert_eq!(payload["embeds"][0]["description"], "No sell signal");
        assert_eq!(payload["embeds"][0]["fields"][0]["value"], "MINT");
    }
}
