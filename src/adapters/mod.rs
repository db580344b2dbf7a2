//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Price cache: in-memory per-instrument price history
//! - Jupiter: swap quote API client
//! - Notify: Telegram, Discord and log alert channels
//! - CLI: Command-line interface handlers

pub mod price_cache;
pub mod jupiter;
pub mod notify;
pub mod cli;

pub use price_cache::InMemoryPriceHistory;
pub use jupiter::JupiterQuoteClient;
pub use notify::{notifier_from_alerts, DiscordNotifier, LogNotifier, TelegramNotifier};
pub use cli::CliApp;
