//! Telegram notifier using the Bot API `sendMessage` endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::Instrument;
use crate::ports::{NotifierError, NotifierPort};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Telegram notifier for alert messages
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    ///
    /// # Arguments
    /// * `bot_token` - Telegram bot token from @BotFather
    /// * `chat_id` - Chat ID to send notifications to
    pub fn new(bot_token: &str, chat_id: &str) -> Result<Self, NotifierError> {
        if bot_token.is_empty() {
            return Err(NotifierError::NotConfigured("Bot token is empty".into()));
        }
        if chat_id.is_empty() {
            return Err(NotifierError::NotConfigured("Chat ID is empty".into()));
        }
        chat_id
            .parse::<i64>()
            .map_err(|e| NotifierError::NotConfigured(format!("Invalid chat ID '{}': {}", chat_id, e)))?;

        Ok(Self {
            http: Client::new(),
            api_url: TELEGRAM_API_URL.to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    /// Point at a different Bot API host (self-hosted bot server)
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    fn format_message(message: &str, instrument: &Instrument) -> String {
        format!(
            "<b>Sell signal</b>\n{}\n<code>{}</code>\n{}",
            html_escape(message),
            html_escape(instrument.as_str()),
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[async_trait]
impl NotifierPort for TelegramNotifier {
    async fn send(&self, message: &str, instrument: &Instrument) -> Result<(), NotifierError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: Self::format_message(message, instrument),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifierError::DeliveryFailed(format!("Telegram request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(NotifierError::DeliveryFailed(format!(
                "Telegram API error {}: {}",
                status, text
            )));
        }

        tracing::debug!("Sent Telegram alert for {}", instrument.short());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_credentials() {
        assert!(TelegramNotifier::new("", "123").is_err());
        assert!(TelegramNotifier::new("token", "").is_err());
        assert!(TelegramNotifier::new("token", "not-a-number").is_err());
        assert!(TelegramNotifier::new("token", "-100123456").is_ok());
    }

    #[test]
    fn test_message_is_html_escaped() {
        let text = TelegramNotifier::format_message("a < b & c", &Instrument::from("MINT<1>"));
        assert!(text.contains("a &lt; b &amp; c"));
        assert!(text.contains("<code>MINT&lt;1&gt;</code>"));
    }
}
