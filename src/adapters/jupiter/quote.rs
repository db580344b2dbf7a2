//! Jupiter Quote Types
//!
//! Request and response structures for the Jupiter swap quote API.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ports::QuoteError;

/// Request parameters for getting a swap quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Input token mint address
    pub input_mint: String,
    /// Output token mint address
    pub output_mint: String,
    /// Amount in base units
    pub amount: u64,
    /// Slippage tolerance in basis points (1 = 0.01%)
    pub slippage_bps: u16,
}

impl QuoteRequest {
    pub fn new(input_mint: String, output_mint: String, amount: u64, slippage_bps: u16) -> Self {
        Self {
            input_mint,
            output_mint,
            amount,
            slippage_bps,
        }
    }

    /// Query string pairs in Jupiter's parameter names
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("inputMint", self.input_mint.clone()),
            ("outputMint", self.output_mint.clone()),
            ("amount", self.amount.to_string()),
            ("slippageBps", self.slippage_bps.to_string()),
        ]
    }
}

/// Convert a slippage percentage into basis points (5% -> 500)
///
/// Rounded to the nearest basis point and clamped to 0..=10000.
pub fn slippage_pct_to_bps(slippage_pct: Decimal) -> u16 {
    let bps = (slippage_pct * Decimal::ONE_HUNDRED)
        .round()
        .clamp(Decimal::ZERO, Decimal::from(10_000));
    bps.to_u16().unwrap_or(10_000)
}

/// Response from Jupiter quote API (fields the exit check needs)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub output_mint: String,
    /// Input amount in base units
    pub in_amount: String,
    /// Expected output amount in base units
    pub out_amount: String,
    /// Minimum output amount after slippage
    #[serde(default)]
    pub other_amount_threshold: String,
    #[serde(default)]
    pub slippage_bps: u16,
    /// Price impact percentage (as string)
    #[serde(default)]
    pub price_impact_pct: String,
    /// Context slot for the quote
    #[serde(default)]
    pub context_slot: Option<u64>,
}

impl QuoteResponse {
    /// Expected output amount
    pub fn output_amount(&self) -> Result<u64, QuoteError> {
        self.out_amount.parse().map_err(|_| {
            QuoteError::InvalidResponse(format!("outAmount '{}' is not an integer", self.out_amount))
        })
    }

    /// Minimum output amount after slippage, 0 if absent
    pub fn min_output_amount(&self) -> u64 {
        self.other_amount_threshold.parse().unwrap_or(0)
    }

    /// Price impact as f64 percentage
    pub fn price_impact(&self) -> f64 {
        self.price_impact_pct.parse().unwrap_or(0.0)
    }
}
