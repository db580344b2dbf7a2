//! Ports Layer - Trait definitions for external collaborators
//!
//! Following hexagonal architecture, these traits abstract:
//! - Price history accumulation (register / mark done / read)
//! - Momentum indicator evaluation (RSI, MACD)
//! - On-chain swap quotes
//! - Alert delivery

pub mod price_history;
pub mod indicators;
pub mod quote;
pub mod notifier;
#[cfg(any(test, feature = "test-util"))]
pub mod mocks;

pub use price_history::{PriceHistoryPort, PriceHistoryError};
pub use indicators::{IndicatorPort, IndicatorError};
pub use quote::{QuotePort, QuoteError};
pub use notifier::{NotifierPort, NotifierError};
