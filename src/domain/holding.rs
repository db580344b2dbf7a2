//! Held Position & Take-Profit Target
//!
//! Amounts are integer base units (lamports, USDC micro-units, raw token
//! units). The profit target is computed with exact decimal arithmetic and
//! floored, so the same inputs always produce the same target.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position acquired by a buy, in base units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Quote currency spent acquiring the position (profit target basis)
    pub cost_basis: u64,
    /// Instrument units received, quoted back into the quote currency on exit
    pub token_amount: u64,
}

impl Holding {
    pub fn new(cost_basis: u64, token_amount: u64) -> Self {
        Self {
            cost_basis,
            token_amount,
        }
    }

    /// Take-profit target for this position
    pub fn take_profit_target(&self, take_profit_pct: Decimal) -> u64 {
        take_profit_target(self.cost_basis, take_profit_pct)
    }
}

/// `amount + floor(amount * take_profit_pct / 100)`
///
/// Negative percentages count as zero. Saturates at `u64::MAX` when the
/// target does not fit, which no quote can exceed.
pub fn take_profit_target(amount: u64, take_profit_pct: Decimal) -> u64 {
    amount.saturating_add(profit_fraction(amount, take_profit_pct))
}

/// `floor(amount * pct / 100)` in base units
pub fn profit_fraction(amount: u64, pct: Decimal) -> u64 {
    let pct = pct.max(Decimal::ZERO);

    Decimal::from(amount)
        .checked_mul(pct)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .map(|fraction| fraction.floor())
        .and_then(|fraction| fraction.to_u64())
        .unwrap_or(u64::MAX)
}
