//! Sniper Signals - entry/exit signal waiters for Solana launch sniping
//!
//! Operator CLI around the buy/sell signal waiters.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use sniper_signals::adapters::cli::{self, load_config_expanded, CliApp};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();
    let config_level = configured_level(&app);
    init_logging(app.verbose, app.debug, config_level.as_deref())?;

    cli::execute(app).await
}

/// `[logging] level` of the command's config, when it loads
fn configured_level(app: &CliApp) -> Option<String> {
    let path = app.command.config_path()?;
    load_config_expanded(path).ok().map(|config| config.logging.level)
}

fn init_logging(verbose: bool, debug: bool, config_level: Option<&str>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else if let Some(level) = config_level {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    } else {
        EnvFilter::new("warn")
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}
