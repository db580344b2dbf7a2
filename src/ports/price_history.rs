//! Price history port
//!
//! Per-instrument price accumulation. The waiters only ever register,
//! mark done and read; appending prices is the provider's business.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::domain::Instrument;

#[derive(Debug, Error)]
pub enum PriceHistoryError {
    #[error("Price history backend unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt price history for {0}")]
    Corrupt(String),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PriceHistoryPort: Send + Sync {
    /// Begin (or continue) tracking prices for an instrument. Idempotent.
    async fn register(&self, instrument: &Instrument) -> Result<(), PriceHistoryError>;

    /// Signal that entry tracking may stop. Idempotent.
    async fn mark_done(&self, instrument: &Instrument) -> Result<(), PriceHistoryError>;

    /// Latest known price sequence in observation order, `None` if nothing
    /// has been observed yet
    async fn get_prices(&self, instrument: &Instrument)
        -> Result<Option<Vec<f64>>, PriceHistoryError>;
}
