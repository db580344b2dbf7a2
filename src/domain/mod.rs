//! Domain Layer - Core types for the signal waiters
//!
//! Pure types and arithmetic with no I/O:
//! - `instrument`: token/pool identity
//! - `holding`: held position and fixed-point take-profit target
//! - `indicator`: RSI/MACD snapshot with the entry and no-data predicates
//! - `timing`: grace deadline and poll iteration helpers

pub mod instrument;
pub mod holding;
pub mod indicator;
pub mod timing;

pub use instrument::Instrument;
pub use holding::{Holding, take_profit_target, profit_fraction};
pub use indicator::{IndicatorSnapshot, MacdValues, RSI_OVERSOLD, RSI_UNCOMPUTED};
pub use timing::{grace_deadline, poll_iterations};
