//! Signal Waiters - Bounded polling state machines for entry and exit
//!
//! - `BuySignalWaiter`: polls price history, gates the entry on RSI/MACD,
//!   aborts early on low volume or uncomputable indicators
//! - `SellSignalWaiter`: polls swap quotes until the take-profit target is
//!   exceeded, then falls back to force-exit or notify-and-hold
//!
//! Both loops are self-terminating by elapsed time. A failing poll tick is
//! logged and skipped; it never ends the loop or reaches the caller.

pub mod buy_waiter;
pub mod sell_waiter;

pub use buy_waiter::{BuySignalWaiter, BuyOutcome};
pub use sell_waiter::{SellSignalWaiter, SellOutcome};

use thiserror::Error;

use crate::ports::{IndicatorError, PriceHistoryError};

/// Failure inside one buy poll tick
#[derive(Debug, Error)]
pub enum TickError {
    #[error("Price history fetch failed: {0}")]
    History(#[from] PriceHistoryError),

    #[error("Indicator evaluation failed: {0}")]
    Indicator(#[from] IndicatorError),
}
