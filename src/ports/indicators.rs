use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::domain::MacdValues;

/// Indicator evaluation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data for calculation: requires {0} elements, got {1}")]
    InsufficientData(usize, usize),

    #[error("Indicator calculation failed: {0}")]
    CalculationError(String),
}

/// Momentum indicator evaluator (RSI, MACD) over a full price sequence
#[cfg_attr(test, automock)]
pub trait IndicatorPort: Send + Sync {
    /// RSI of the sequence; 0 when not yet computable
    fn rsi(&self, prices: &[f64]) -> Result<f64, IndicatorError>;

    /// MACD and signal line of the sequence; lines absent when not computable
    fn macd(&self, prices: &[f64]) -> Result<MacdValues, IndicatorError>;
}
