//! Sell Signal Waiter
//!
//! Exit gate for a held position. Quotes the held token amount every
//! `price_check_interval` for at most `ceil(price_check_duration /
//! price_check_interval)` ticks, never past `price_check_duration` of wall
//! time (a slow quote is cut off at the deadline), and approves the sell once the quote exceeds
//! `cost_basis + floor(cost_basis * take_profit / 100)`.
//!
//! Quotes are re-fetched every tick from live venue state, never cached.

use std::sync::Arc;

use tokio::time::{sleep, timeout, Instant};

use crate::config::SignalConfig;
use crate::domain::{poll_iterations, Holding, Instrument};
use crate::ports::{NotifierPort, PriceHistoryPort, QuotePort};

/// Why the sell waiter decided what it decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellOutcome {
    /// Price checks disabled (zero duration or interval), sell immediately
    Disabled,
    /// A quote exceeded the take-profit target
    TakeProfit { quoted: u64, target: u64 },
    /// Window ended without profit, auto-sell configured
    ForcedExit { target: u64, last_quote: Option<u64> },
    /// Window ended without profit, alert sent, keep holding
    Hold { target: u64, last_quote: Option<u64> },
}

impl SellOutcome {
    pub fn should_sell(&self) -> bool {
        !matches!(self, SellOutcome::Hold { .. })
    }
}

/// Take-profit exit gate over a quote provider
pub struct SellSignalWaiter {
    history: Arc<dyn PriceHistoryPort>,
    quotes: Arc<dyn QuotePort>,
    notifier: Arc<dyn NotifierPort>,
}

impl SellSignalWaiter {
    pub fn new(
        history: Arc<dyn PriceHistoryPort>,
        quotes: Arc<dyn QuotePort>,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            history,
            quotes,
            notifier,
        }
    }

    /// `true` to sell, `false` to keep holding
    pub async fn evaluate(
        &self,
        holding: &Holding,
        instrument: &Instrument,
        config: &SignalConfig,
    ) -> bool {
        self.evaluate_detailed(holding, instrument, config)
            .await
            .should_sell()
    }

    /// Run the price-check window and report the outcome
    pub async fn evaluate_detailed(
        &self,
        holding: &Holding,
        instrument: &Instrument,
        config: &SignalConfig,
    ) -> SellOutcome {
        // Entry tracking ends once the position is held
        if let Err(e) = self.history.mark_done(instrument).await {
            tracing::warn!("Failed to mark {} done in price history: {}", instrument, e);
        }

        if !config.sell_checks_enabled() {
            tracing::info!("{} price checks disabled, selling", instrument.short());
            return SellOutcome::Disabled;
        }

        let target = holding.take_profit_target(config.take_profit);
        let duration = config.price_check_duration();
        let interval = config.price_check_interval();
        let iterations = poll_iterations(duration, interval);
        let mut last_quote = None;

        tracing::info!(
            "{} waiting for take profit: target={} cost={} tokens={} (max {} checks)",
            instrument.short(),
            target,
            holding.cost_basis,
            holding.token_amount,
            iterations
        );

        let started = Instant::now();

        for tick in 0..iterations {
            if tick > 0 {
                if started.elapsed() >= duration {
                    break;
                }
                sleep(interval).await;
            }

            let remaining = duration.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                break;
            }

            let fetched = timeout(
                remaining,
                self.quotes
                    .quote(instrument, holding.token_amount, config.sell_slippage),
            )
            .await;

            match fetched {
                Err(_) => {
                    tracing::trace!("{} quote outlived the check window", instrument.short());
                }
                Ok(Ok(quoted)) => {
                    tracing::debug!(
                        "{} quote {}/{}: {} vs target {}",
                        instrument.short(),
                        tick + 1,
                        iterations,
                        quoted,
                        target
                    );
                    last_quote = Some(quoted);

                    if quoted > target {
                        tracing::info!(
                            "{} take profit reached: {} > {}",
                            instrument.short(),
                            quoted,
                            target
                        );
                        return SellOutcome::TakeProfit { quoted, target };
                    }
                }
                Ok(Err(e)) => {
                    tracing::trace!("{} sell tick skipped: {}", instrument.short(), e);
                }
            }
        }

        if config.auto_sell_without_sell_signal {
            tracing::info!(
                "{} no take profit within window, auto-selling",
                instrument.short()
            );
            return SellOutcome::ForcedExit { target, last_quote };
        }

        let message = hold_message(instrument, target, last_quote);
        if let Err(e) = self.notifier.send(&message, instrument).await {
            tracing::warn!("Failed to send no-sell-signal alert for {}: {}", instrument, e);
        }

        SellOutcome::Hold { target, last_quote }
    }
}

fn hold_message(instrument: &Instrument, target: u64, last_quote: Option<u64>) -> String {
    let last = last_quote
        .map(|q| q.to_string())
        .unwrap_or_else(|| "none".to_string());
    format!(
        "No sell signal reached for {} (target {}, last quote {}). Holding position.",
        instrument, target, last
    )
}
