//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, SignalConfig, JupiterSection, AlertsSection, LoggingSection, ConfigError,
    load_config, parse_config, USDC_MINT,
};
