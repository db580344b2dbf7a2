//! Momentum Indicator Snapshot
//!
//! RSI/MACD state for one poll tick, recomputed from the full price sequence.
//! The entry rule and the "nothing to compute on" check live here so both
//! waiters and tests share the exact same predicates.
//!
//! - Entry: `0 < rsi < 30` (oversold), both MACD lines present, MACD line
//!   above signal line (bullish cross)
//! - No data: `rsi == 0` and the MACD line unset (absent, zero or NaN)

use serde::{Deserialize, Serialize};

/// RSI strictly below this is oversold
pub const RSI_OVERSOLD: f64 = 30.0;

/// RSI value reported before enough samples exist
pub const RSI_UNCOMPUTED: f64 = 0.0;

/// MACD output of an indicator evaluator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdValues {
    pub macd_line: Option<f64>,
    pub signal_line: Option<f64>,
}

impl MacdValues {
    pub fn new(macd_line: f64, signal_line: f64) -> Self {
        Self {
            macd_line: Some(macd_line),
            signal_line: Some(signal_line),
        }
    }

    /// Neither line computable yet
    pub fn absent() -> Self {
        Self::default()
    }

    /// MACD line strictly above the signal line, both present
    pub fn is_bullish_cross(&self) -> bool {
        match (self.macd_line, self.signal_line) {
            (Some(macd), Some(signal)) => macd > signal,
            _ => false,
        }
    }

    fn macd_line_unset(&self) -> bool {
        match self.macd_line {
            None => true,
            Some(v) => v == 0.0 || v.is_nan(),
        }
    }
}

/// Indicator state for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd_line: Option<f64>,
    pub signal_line: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn new(rsi: f64, macd: MacdValues) -> Self {
        Self {
            rsi,
            macd_line: macd.macd_line,
            signal_line: macd.signal_line,
        }
    }

    pub fn macd(&self) -> MacdValues {
        MacdValues {
            macd_line: self.macd_line,
            signal_line: self.signal_line,
        }
    }

    /// RSI within (0, 30)
    pub fn is_oversold(&self) -> bool {
        self.rsi > RSI_UNCOMPUTED && self.rsi < RSI_OVERSOLD
    }

    /// Oversold with a confirmed bullish MACD cross. Partial signals never pass.
    pub fn is_entry_signal(&self) -> bool {
        self.is_oversold() && self.macd().is_bullish_cross()
    }

    /// `rsi == 0` with no usable MACD line
    ///
    /// A legitimately zero MACD line also matches; callers rely on that.
    pub fn is_uncomputed(&self) -> bool {
        self.rsi == RSI_UNCOMPUTED && self.macd().macd_line_unset()
    }
}
