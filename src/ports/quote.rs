use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::domain::Instrument;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("No route found for {0}")]
    NoRoute(String),

    #[error("Invalid quote response: {0}")]
    InvalidResponse(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Expected swap output from current venue state
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuotePort: Send + Sync {
    /// Output amount (quote currency base units) for selling `input_amount`
    /// units of `instrument` under `slippage_pct` tolerance
    async fn quote(
        &self,
        instrument: &Instrument,
        input_amount: u64,
        slippage_pct: Decimal,
    ) -> Result<u64, QuoteError>;
}
