//! Jupiter Adapter
//!
//! Implementation of the QuotePort for the Jupiter DEX aggregator.

mod client;
mod quote;

pub use client::{JupiterConfig, JupiterQuoteClient};
pub use quote::{slippage_pct_to_bps, QuoteRequest, QuoteResponse};
