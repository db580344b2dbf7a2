//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Every section and field
//! has a default, so a config file only needs to name what it overrides.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// USDC mint address on Solana mainnet
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub signals: SignalConfig,
    #[serde(default)]
    pub jupiter: JupiterSection,
    #[serde(default)]
    pub alerts: AlertsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Buy/sell signal configuration (`[signals]`)
#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    // =========================================================================
    // Buy Signal
    // =========================================================================
    /// Gate entries on RSI/MACD. If false every buy is approved immediately.
    #[serde(default = "default_use_technical_analysis")]
    pub use_technical_analysis: bool,

    /// Total time to wait for a buy signal
    #[serde(default = "default_buy_signal_time_to_wait_ms")]
    pub buy_signal_time_to_wait_ms: u64,

    /// Price history poll interval while waiting
    #[serde(default = "default_buy_signal_price_interval_ms")]
    pub buy_signal_price_interval_ms: u64,

    /// Percentage of the total wait after which low-volume / no-data aborts apply
    #[serde(default = "default_buy_signal_fraction_percentage_time_to_wait")]
    pub buy_signal_fraction_percentage_time_to_wait: f64,

    /// Minimum number of observed prices to keep waiting past the grace deadline
    #[serde(default = "default_buy_signal_low_volume_threshold")]
    pub buy_signal_low_volume_threshold: usize,

    // =========================================================================
    // Sell Signal
    // =========================================================================
    /// Total time to poll quotes for take-profit (0 = sell immediately)
    #[serde(default = "default_price_check_duration_ms")]
    pub price_check_duration_ms: u64,

    /// Quote poll interval (0 = sell immediately)
    #[serde(default = "default_price_check_interval_ms")]
    pub price_check_interval_ms: u64,

    /// Take profit percentage over the cost basis
    #[serde(default = "default_take_profit")]
    pub take_profit: Decimal,

    /// Slippage tolerance percentage for sell quotes
    #[serde(default = "default_sell_slippage")]
    pub sell_slippage: Decimal,

    /// Approve the sell when the check window ends without reaching take profit
    #[serde(default = "default_auto_sell_without_sell_signal")]
    pub auto_sell_without_sell_signal: bool,
}

fn default_use_technical_analysis() -> bool {
    true
}
fn default_buy_signal_time_to_wait_ms() -> u64 {
    300_000
}
fn default_buy_signal_price_interval_ms() -> u64 {
    2_000
}
fn default_buy_signal_fraction_percentage_time_to_wait() -> f64 {
    50.0
}
fn default_buy_signal_low_volume_threshold() -> usize {
    30
}
fn default_price_check_duration_ms() -> u64 {
    600_000
}
fn default_price_check_interval_ms() -> u64 {
    2_000
}
fn default_take_profit() -> Decimal {
    dec!(40)
}
fn default_sell_slippage() -> Decimal {
    dec!(20)
}
fn default_auto_sell_without_sell_signal() -> bool {
    true
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            use_technical_analysis: default_use_technical_analysis(),
            buy_signal_time_to_wait_ms: default_buy_signal_time_to_wait_ms(),
            buy_signal_price_interval_ms: default_buy_signal_price_interval_ms(),
            buy_signal_fraction_percentage_time_to_wait:
                default_buy_signal_fraction_percentage_time_to_wait(),
            buy_signal_low_volume_threshold: default_buy_signal_low_volume_threshold(),
            price_check_duration_ms: default_price_check_duration_ms(),
            price_check_interval_ms: default_price_check_interval_ms(),
            take_profit: default_take_profit(),
            sell_slippage: default_sell_slippage(),
            auto_sell_without_sell_signal: default_auto_sell_without_sell_signal(),
        }
    }
}

impl SignalConfig {
    pub fn buy_signal_time_to_wait(&self) -> Duration {
        Duration::from_millis(self.buy_signal_time_to_wait_ms)
    }

    pub fn buy_signal_price_interval(&self) -> Duration {
        Duration::from_millis(self.buy_signal_price_interval_ms)
    }

    pub fn price_check_duration(&self) -> Duration {
        Duration::from_millis(self.price_check_duration_ms)
    }

    pub fn price_check_interval(&self) -> Duration {
        Duration::from_millis(self.price_check_interval_ms)
    }

    /// Sell-signal checking is off when either the window or interval is zero
    pub fn sell_checks_enabled(&self) -> bool {
        self.price_check_duration_ms > 0 && self.price_check_interval_ms > 0
    }

    /// Validate the signal section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.use_technical_analysis && self.buy_signal_price_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "buy_signal_price_interval_ms must be > 0 when use_technical_analysis is set"
                    .to_string(),
            ));
        }

        let fraction = self.buy_signal_fraction_percentage_time_to_wait;
        if !fraction.is_finite() || !(0.0..=100.0).contains(&fraction) {
            return Err(ConfigError::ValidationError(format!(
                "buy_signal_fraction_percentage_time_to_wait must be 0-100, got {}",
                fraction
            )));
        }

        if self.take_profit < Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "take_profit must be >= 0, got {}",
                self.take_profit
            )));
        }

        if self.sell_slippage < Decimal::ZERO || self.sell_slippage > Decimal::ONE_HUNDRED {
            return Err(ConfigError::ValidationError(format!(
                "sell_slippage must be 0-100, got {}",
                self.sell_slippage
            )));
        }

        Ok(())
    }
}

/// Jupiter quote API configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct JupiterSection {
    /// Jupiter swap API base URL
    #[serde(default = "default_jupiter_api_url")]
    pub api_url: String,
    /// Optional API key for higher rate limits
    #[serde(default)]
    pub api_key: Option<String>,
    /// Mint the held tokens are quoted back into
    #[serde(default = "default_quote_mint")]
    pub quote_mint: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_jupiter_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts per quote before the tick counts as failed
    #[serde(default = "default_jupiter_max_retries")]
    pub max_retries: u32,
}

fn default_jupiter_api_url() -> String {
    "https://api.jup.ag/swap/v1".to_string()
}
fn default_quote_mint() -> String {
    USDC_MINT.to_string()
}
fn default_jupiter_timeout_secs() -> u64 {
    10
}
fn default_jupiter_max_retries() -> u32 {
    3
}

impl Default for JupiterSection {
    fn default() -> Self {
        Self {
            api_url: default_jupiter_api_url(),
            api_key: None,
            quote_mint: default_quote_mint(),
            timeout_secs: default_jupiter_timeout_secs(),
            max_retries: default_jupiter_max_retries(),
        }
    }
}

impl JupiterSection {
    /// Get API key with environment variable override
    /// Checks JUPITER_API_KEY env var first, falls back to config value
    pub fn get_api_key(&self) -> Option<String> {
        std::env::var("JUPITER_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// Alerts configuration section (optional)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertsSection {
    /// Enable Discord webhook notifications
    #[serde(default)]
    pub discord_enabled: bool,
    /// Discord webhook URL
    #[serde(default)]
    pub discord_webhook_url: String,
    /// Enable Telegram notifications
    #[serde(default)]
    pub telegram_enabled: bool,
    /// Telegram bot token
    #[serde(default)]
    pub telegram_bot_token: String,
    /// Telegram chat ID
    #[serde(default)]
    pub telegram_chat_id: String,
}

impl AlertsSection {
    /// Checks DISCORD_WEBHOOK_URL env var first, falls back to config value
    pub fn get_discord_webhook_url(&self) -> String {
        env_or("DISCORD_WEBHOOK_URL", &self.discord_webhook_url)
    }

    /// Checks TELEGRAM_BOT_TOKEN env var first, falls back to config value
    pub fn get_telegram_bot_token(&self) -> String {
        env_or("TELEGRAM_BOT_TOKEN", &self.telegram_bot_token)
    }

    /// Checks TELEGRAM_CHAT_ID env var first, falls back to config value
    pub fn get_telegram_chat_id(&self) -> String {
        env_or("TELEGRAM_CHAT_ID", &self.telegram_chat_id)
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.signals.validate()?;

        if self.jupiter.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "jupiter.api_url must not be empty".to_string(),
            ));
        }

        if self.jupiter.quote_mint.is_empty() {
            return Err(ConfigError::ValidationError(
                "jupiter.quote_mint must not be empty".to_string(),
            ));
        }

        if self.alerts.telegram_enabled
            && (self.alerts.get_telegram_bot_token().is_empty()
                || self.alerts.get_telegram_chat_id().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "telegram_enabled requires telegram_bot_token and telegram_chat_id".to_string(),
            ));
        }

        if self.alerts.discord_enabled && self.alerts.get_discord_webhook_url().is_empty() {
            return Err(ConfigError::ValidationError(
                "discord_enabled requires discord_webhook_url".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got '{}'",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[signals]
use_technical_analysis = true
buy_signal_time_to_wait_ms = 120000
buy_signal_price_interval_ms = 1000
buy_signal_fraction_percentage_time_to_wait = 25
buy_signal_low_volume_threshold = 15
price_check_duration_ms = 300000
price_check_interval_ms = 1500
take_profit = 12.5
sell_slippage = 5
auto_sell_without_sell_signal = false

[jupiter]
api_url = "https://public.jupiterapi.com"
quote_mint = "So11111111111111111111111111111111111111112"

[logging]
level = "debug"
"#
        .to_string()
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();

        assert!(config.signals.use_technical_analysis);
        assert_eq!(config.signals.buy_signal_time_to_wait(), Duration::from_secs(120));
        assert_eq!(config.signals.buy_signal_price_interval(), Duration::from_secs(1));
        assert_eq!(config.signals.buy_signal_fraction_percentage_time_to_wait, 25.0);
        assert_eq!(config.signals.buy_signal_low_volume_threshold, 15);
        assert_eq!(config.signals.price_check_interval(), Duration::from_millis(1500));
        assert_eq!(config.signals.take_profit, dec!(12.5));
        assert_eq!(config.signals.sell_slippage, dec!(5));
        assert!(!config.signals.auto_sell_without_sell_signal);
        assert_eq!(config.jupiter.api_url, "https://public.jupiterapi.com");
        assert_eq!(config.jupiter.max_retries, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();

        assert!(config.signals.use_technical_analysis);
        assert_eq!(config.signals.buy_signal_time_to_wait_ms, 300_000);
        assert_eq!(config.signals.take_profit, dec!(40));
        assert!(config.signals.sell_checks_enabled());
        assert_eq!(config.jupiter.quote_mint, USDC_MINT);
        assert!(!config.alerts.telegram_enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let result = parse_config("[signals\nuse_technical_analysis = ");
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_invalid_fraction() {
        let result = parse_config(
            r#"
[signals]
buy_signal_fraction_percentage_time_to_wait = 150
"#,
        );
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_zero_buy_interval_only_rejected_with_ta() {
        let with_ta = parse_config(
            r#"
[signals]
buy_signal_price_interval_ms = 0
"#,
        );
        assert!(with_ta.is_err());

        let manual = parse_config(
            r#"
[signals]
use_technical_analysis = false
buy_signal_price_interval_ms = 0
"#,
        );
        assert!(manual.is_ok());
    }

    #[test]
    fn test_negative_take_profit_rejected() {
        let result = parse_config("[signals]\ntake_profit = -5\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_sell_slippage_bounds() {
        assert!(parse_config("[signals]\nsell_slippage = 101\n").is_err());
        assert!(parse_config("[signals]\nsell_slippage = 100\n").is_ok());
    }

    #[test]
    fn test_zero_price_check_disables_sell_checks() {
        let config = parse_config("[signals]\nprice_check_duration_ms = 0\n").unwrap();
        assert!(!config.signals.sell_checks_enabled());

        let config = parse_config("[signals]\nprice_check_interval_ms = 0\n").unwrap();
        assert!(!config.signals.sell_checks_enabled());
    }

    #[test]
    fn test_invalid_log_level() {
        let result = parse_config("[logging]\nlevel = \"loud\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = parse_config(include_str!("../../config/signals.toml")).unwrap();
        let defaults = SignalConfig::default();

        assert_eq!(config.signals.take_profit, defaults.take_profit);
        assert_eq!(config.signals.buy_signal_time_to_wait_ms, defaults.buy_signal_time_to_wait_ms);
        assert_eq!(config.signals.price_check_interval_ms, defaults.price_check_interval_ms);
        assert_eq!(config.jupiter.quote_mint, USDC_MINT);
    }
}
