//! CLI Command Handlers
//!
//! Operator commands around the signal waiters: check a config, compute a
//! take-profit target, run a sell wait against live Jupiter quotes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::adapters::jupiter::{JupiterConfig, JupiterQuoteClient};
use crate::adapters::notify::notifier_from_alerts;
use crate::adapters::price_cache::InMemoryPriceHistory;
use crate::config::{load_config, Config};
use crate::domain::{take_profit_target, Holding, Instrument};
use crate::signals::SellSignalWaiter;

/// Sniper Signals - entry/exit signal waiters for Solana launch sniping
#[derive(Parser, Debug)]
#[command(
    name = "sniper-signals",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Entry/exit signal waiters for Solana launch sniping",
    long_about = "Gates entries on RSI/MACD momentum and exits on a fixed-point take-profit \
                  target checked against live Jupiter quotes."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate a configuration file
    Validate(ValidateCmd),

    /// Compute the take-profit target for a cost basis
    Target(TargetCmd),

    /// Poll Jupiter quotes until take profit or the check window ends
    SellWait(SellWaitCmd),
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct ValidateCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/signals.toml")]
    pub config: PathBuf,
}

/// Compute a take-profit target
#[derive(Parser, Debug)]
pub struct TargetCmd {
    /// Quote currency spent, in base units
    #[arg(value_name = "COST")]
    pub cost: u64,

    /// Take profit percentage (overrides the config value)
    #[arg(long, value_name = "PCT")]
    pub take_profit: Option<Decimal>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Run the sell signal waiter
#[derive(Parser, Debug)]
pub struct SellWaitCmd {
    /// Token mint of the held position
    #[arg(long, value_name = "MINT")]
    pub mint: String,

    /// Quote currency spent acquiring the position, in base units
    #[arg(long, value_name = "AMOUNT")]
    pub cost: u64,

    /// Token amount held, in base units
    #[arg(long, value_name = "AMOUNT")]
    pub tokens: u64,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/signals.toml")]
    pub config: PathBuf,
}

impl Command {
    /// Config file the command reads, if any
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Validate(cmd) => Some(&cmd.config),
            Command::Target(cmd) => cmd.config.as_deref(),
            Command::SellWait(cmd) => Some(&cmd.config),
        }
    }
}

/// Execute the parsed CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    match app.command {
        Command::Validate(cmd) => validate_command(cmd),
        Command::Target(cmd) => target_command(cmd),
        Command::SellWait(cmd) => sell_wait_command(cmd).await,
    }
}

/// Load a config from a path that may start with `~`
pub fn load_config_expanded(path: &Path) -> Result<Config> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
    load_config(&expanded).with_context(|| format!("Failed to load configuration from {}", expanded))
}

fn validate_command(cmd: ValidateCmd) -> Result<()> {
    let config = load_config_expanded(&cmd.config)?;
    let signals = &config.signals;

    println!("Configuration OK: {}", cmd.config.display());
    println!("[signals]");
    println!("  use_technical_analysis       = {}", signals.use_technical_analysis);
    println!("  buy wait                     = {:?}", signals.buy_signal_time_to_wait());
    println!("  buy poll interval            = {:?}", signals.buy_signal_price_interval());
    println!(
        "  low-volume grace             = {}% ({} samples)",
        signals.buy_signal_fraction_percentage_time_to_wait,
        signals.buy_signal_low_volume_threshold
    );
    println!("  price check window           = {:?}", signals.price_check_duration());
    println!("  price check interval         = {:?}", signals.price_check_interval());
    println!("  take profit                  = {}%", signals.take_profit);
    println!("  sell slippage                = {}%", signals.sell_slippage);
    println!("  auto sell without signal     = {}", signals.auto_sell_without_sell_signal);
    println!("[jupiter]");
    println!("  api_url                      = {}", config.jupiter.api_url);
    println!("  quote_mint                   = {}", config.jupiter.quote_mint);
    println!(
        "  api_key                      = {}",
        if config.jupiter.get_api_key().is_some() { "set" } else { "none" }
    );
    println!("[alerts]");
    println!("  telegram                     = {}", config.alerts.telegram_enabled);
    println!("  discord                      = {}", config.alerts.discord_enabled);

    Ok(())
}

fn target_command(cmd: TargetCmd) -> Result<()> {
    let take_profit = match (cmd.take_profit, &cmd.config) {
        (Some(pct), _) => pct,
        (None, Some(path)) => load_config_expanded(path)?.signals.take_profit,
        (None, None) => Config::default().signals.take_profit,
    };

    let target = take_profit_target(cmd.cost, take_profit);
    println!("cost={} take_profit={}% target={}", cmd.cost, take_profit, target);
    Ok(())
}

async fn sell_wait_command(cmd: SellWaitCmd) -> Result<()> {
    let config = load_config_expanded(&cmd.config)?;

    let quotes = JupiterQuoteClient::with_config(JupiterConfig::from(&config.jupiter))
        .context("Failed to create Jupiter client")?;
    let history = InMemoryPriceHistory::new();
    let notifier = notifier_from_alerts(&config.alerts);

    let waiter = SellSignalWaiter::new(Arc::new(history), Arc::new(quotes), notifier);
    let holding = Holding::new(cmd.cost, cmd.tokens);
    let instrument = Instrument::new(cmd.mint);

    let outcome = waiter
        .evaluate_detailed(&holding, &instrument, &config.signals)
        .await;

    println!("{}: {:?}", instrument, outcome);
    println!("sell = {}", outcome.should_sell());
    Ok(())
}
