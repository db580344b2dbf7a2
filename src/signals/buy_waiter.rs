//! Buy Signal Waiter
//!
//! Entry gate for a freshly launched instrument. Polls the price history at
//! `buy_signal_price_interval` for up to `buy_signal_time_to_wait` and
//! approves the buy on an oversold RSI with a bullish MACD cross.
//!
//! Past the grace deadline (`buy_signal_fraction_percentage_time_to_wait`
//! percent of the total wait) the waiter abstains early when:
//! - fewer than `buy_signal_low_volume_threshold` prices were observed, or
//! - the indicators still have nothing to compute on (`rsi == 0`, no MACD)

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::config::SignalConfig;
use crate::domain::{grace_deadline, IndicatorSnapshot, Instrument};
use crate::ports::{IndicatorPort, PriceHistoryPort};
use super::TickError;

/// Floor for the buy poll cadence; a zero interval would spin
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Why the buy waiter decided what it decided
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuyOutcome {
    /// Technical analysis disabled, buy approved without waiting
    Disabled,
    /// Entry rule satisfied on this snapshot
    Signal(IndicatorSnapshot),
    /// Too few price samples past the grace deadline
    LowVolume { samples: usize },
    /// Indicators uncomputable past the grace deadline
    NoData,
    /// Total wait elapsed without a signal
    TimedOut,
}

impl BuyOutcome {
    pub fn should_buy(&self) -> bool {
        matches!(self, BuyOutcome::Disabled | BuyOutcome::Signal(_))
    }
}

/// RSI/MACD entry gate over a price history provider
pub struct BuySignalWaiter {
    history: Arc<dyn PriceHistoryPort>,
    indicators: Arc<dyn IndicatorPort>,
}

impl BuySignalWaiter {
    pub fn new(history: Arc<dyn PriceHistoryPort>, indicators: Arc<dyn IndicatorPort>) -> Self {
        Self {
            history,
            indicators,
        }
    }

    /// `true` to buy, `false` to abstain
    pub async fn evaluate(&self, instrument: &Instrument, config: &SignalConfig) -> bool {
        self.evaluate_detailed(instrument, config).await.should_buy()
    }

    /// Run the wait and report the outcome
    ///
    /// The history registration is marked done on every exit, buy or not.
    pub async fn evaluate_detailed(
        &self,
        instrument: &Instrument,
        config: &SignalConfig,
    ) -> BuyOutcome {
        if !config.use_technical_analysis {
            tracing::info!("{} technical analysis disabled, buying", instrument.short());
            return BuyOutcome::Disabled;
        }

        if let Err(e) = self.history.register(instrument).await {
            tracing::warn!("Failed to register {} for price history: {}", instrument, e);
        }

        let outcome = self.wait_for_signal(instrument, config).await;

        match outcome {
            BuyOutcome::Signal(snapshot) => {
                tracing::info!(
                    "{} buy signal | rsi={:.2} macd={:.6} signal={:.6}",
                    instrument.short(),
                    snapshot.rsi,
                    snapshot.macd_line.unwrap_or_default(),
                    snapshot.signal_line.unwrap_or_default()
                );
            }
            other => {
                tracing::info!("{} no buy signal: {:?}", instrument.short(), other);
            }
        }

        if let Err(e) = self.history.mark_done(instrument).await {
            tracing::warn!("Failed to mark {} done in price history: {}", instrument, e);
        }

        outcome
    }

    async fn wait_for_signal(&self, instrument: &Instrument, config: &SignalConfig) -> BuyOutcome {
        let total = config.buy_signal_time_to_wait();
        let interval = config.buy_signal_price_interval().max(MIN_POLL_INTERVAL);
        let grace = grace_deadline(total, config.buy_signal_fraction_percentage_time_to_wait);
        let threshold = config.buy_signal_low_volume_threshold;
        let started = Instant::now();

        while started.elapsed() < total {
            match self.tick(instrument).await {
                Ok(Some((samples, snapshot))) => {
                    tracing::debug!(
                        "{} samples={} rsi={:.2} macd={:?} signal={:?}",
                        instrument.short(),
                        samples,
                        snapshot.rsi,
                        snapshot.macd_line,
                        snapshot.signal_line
                    );

                    if snapshot.is_entry_signal() {
                        return BuyOutcome::Signal(snapshot);
                    }

                    if started.elapsed() > grace {
                        if samples < threshold {
                            return BuyOutcome::LowVolume { samples };
                        }
                        if snapshot.is_uncomputed() {
                            return BuyOutcome::NoData;
                        }
                    }
                }
                Ok(None) => {
                    tracing::trace!("{} no price data yet", instrument.short());
                }
                Err(e) => {
                    tracing::trace!("{} buy tick skipped: {}", instrument.short(), e);
                }
            }

            sleep(interval).await;
        }

        BuyOutcome::TimedOut
    }

    /// Sample count and indicator snapshot, `None` while no prices exist
    async fn tick(
        &self,
        instrument: &Instrument,
    ) -> Result<Option<(usize, IndicatorSnapshot)>, TickError> {
        let prices = match self.history.get_prices(instrument).await? {
            Some(prices) if !prices.is_empty() => prices,
            _ => return Ok(None),
        };

        let rsi = self.indicators.rsi(&prices)?;
        let macd = self.indicators.macd(&prices)?;

        Ok(Some((prices.len(), IndicatorSnapshot::new(rsi, macd))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::domain::MacdValues;
    use crate::ports::indicators::MockIndicatorPort;
    use crate::ports::mocks::ScriptedIndicators;
    use crate::ports::price_history::MockPriceHistoryPort;
    use crate::ports::{IndicatorError, PriceHistoryError};

    fn test_config() -> SignalConfig {
        SignalConfig {
            use_technical_analysis: true,
            buy_signal_time_to_wait_ms: 10_000,
            buy_signal_price_interval_ms: 1_000,
            buy_signal_fraction_percentage_time_to_wait: 50.0,
            buy_signal_low_volume_threshold: 10,
            ..SignalConfig::default()
        }
    }

    fn oversold_cross() -> IndicatorSnapshot {
        IndicatorSnapshot::new(24.0, MacdValues::new(0.004, 0.001))
    }

    fn neutral() -> IndicatorSnapshot {
        IndicatorSnapshot::new(55.0, MacdValues::new(0.001, 0.002))
    }

    /// History whose sequence grows by one price per fetch
    fn growing_history(start_len: usize) -> MockPriceHistoryPort {
        let mut history = MockPriceHistoryPort::new();
        let fetches = AtomicUsize::new(0);
        history.expect_register().returning(|_| Ok(()));
        history.expect_get_prices().returning(move |_| {
            let n = start_len + fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Some((0..n).map(|i| 1.0 + i as f64 * 0.01).collect()))
        });
        history
    }

    fn waiter(history: MockPriceHistoryPort, indicators: impl IndicatorPort + 'static) -> BuySignalWaiter {
        BuySignalWaiter::new(Arc::new(history), Arc::new(indicators))
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_buys_without_touching_history() {
        // No expectations: any history or indicator call panics
        let history = MockPriceHistoryPort::new();
        let indicators = MockIndicatorPort::new();
        let waiter = waiter(history, indicators);

        let config = SignalConfig {
            use_technical_analysis: false,
            ..test_config()
        };

        let started = Instant::now();
        let outcome = waiter.evaluate_detailed(&Instrument::from("MINT"), &config).await;

        assert_eq!(outcome, BuyOutcome::Disabled);
        assert!(outcome.should_buy());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_buys_on_tick_with_oversold_cross() {
        // Sequence lengths 12, 13, 14 ... ; the signal forms at 14 (third tick)
        let mut history = growing_history(12);
        history.expect_mark_done().times(1).returning(|_| Ok(()));
        let indicators = ScriptedIndicators::new()
            .with_fallback(neutral())
            .with_snapshot_at(14, oversold_cross());
        let waiter = waiter(history, indicators.clone());

        let started = Instant::now();
        let outcome = waiter
            .evaluate_detailed(&Instrument::from("MINT"), &test_config())
            .await;

        assert_eq!(outcome, BuyOutcome::Signal(oversold_cross()));
        assert_eq!(started.elapsed(), Duration::from_secs(2));
        assert_eq!(indicators.get_calls(), vec![12, 13, 14]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_before_grace_wins_over_low_volume() {
        let mut history = growing_history(1);
        history.expect_mark_done().times(1).returning(|_| Ok(()));
        let indicators = ScriptedIndicators::new().with_snapshot_at(1, oversold_cross());
        let waiter = waiter(history, indicators);

        assert!(waiter.evaluate(&Instrument::from("MINT"), &test_config()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_low_volume_aborts_after_grace() {
        let mut history = MockPriceHistoryPort::new();
        history.expect_register().times(1).returning(|_| Ok(()));
        history
            .expect_get_prices()
            .returning(|_| Ok(Some(vec![1.0, 1.1, 1.2])));
        history.expect_mark_done().times(1).returning(|_| Ok(()));
        let waiter = waiter(history, ScriptedIndicators::new().with_fallback(neutral()));

        let started = Instant::now();
        let outcome = waiter
            .evaluate_detailed(&Instrument::from("DEADPOOL"), &test_config())
            .await;

        assert_eq!(outcome, BuyOutcome::LowVolume { samples: 3 });
        assert!(!outcome.should_buy());
        // grace is 5s and must be exceeded, first tick past it is at 6s
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_data_aborts_after_grace() {
        let mut history = growing_history(20);
        history.expect_mark_done().times(1).returning(|_| Ok(()));
        // Fallback snapshot is rsi=0 with MACD absent
        let waiter = waiter(history, ScriptedIndicators::new());

        let outcome = waiter
            .evaluate_detailed(&Instrument::from("MINT"), &test_config())
            .await;

        assert_eq!(outcome, BuyOutcome::NoData);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_signal_never_buys() {
        let mut history = growing_history(20);
        history.expect_mark_done().times(1).returning(|_| Ok(()));
        let partial = IndicatorSnapshot::new(
            18.0,
            MacdValues {
                macd_line: Some(0.5),
                signal_line: None,
            },
        );
        let waiter = waiter(history, ScriptedIndicators::new().with_fallback(partial));

        let outcome = waiter
            .evaluate_detailed(&Instrument::from("MINT"), &test_config())
            .await;

        assert_eq!(outcome, BuyOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_failures_never_end_loop_early() {
        let mut history = MockPriceHistoryPort::new();
        history.expect_register().returning(|_| Ok(()));
        history
            .expect_get_prices()
            .times(10)
            .returning(|_| Err(PriceHistoryError::Unavailable("cache offline".into())));
        history.expect_mark_done().times(1).returning(|_| Ok(()));
        let waiter = waiter(history, MockIndicatorPort::new());

        let started = Instant::now();
        let outcome = waiter
            .evaluate_detailed(&Instrument::from("MINT"), &test_config())
            .await;

        assert_eq!(outcome, BuyOutcome::TimedOut);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_indicator_failures_are_swallowed() {
        let mut history = growing_history(5);
        history.expect_mark_done().returning(|_| Ok(()));
        let mut indicators = MockIndicatorPort::new();
        indicators
            .expect_rsi()
            .returning(|_| Err(IndicatorError::CalculationError("divide by zero".into())));
        let waiter = waiter(history, indicators);

        let outcome = waiter
            .evaluate_detailed(&Instrument::from("MINT"), &test_config())
            .await;

        // Low-volume abort never fires because no tick produced a snapshot
        assert_eq!(outcome, BuyOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_prices_skip_abort_rules() {
        let mut history = MockPriceHistoryPort::new();
        history.expect_register().returning(|_| Ok(()));
        let fetches = AtomicUsize::new(0);
        history.expect_get_prices().returning(move |_| {
            if fetches.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Ok(None)
            } else {
                Ok(Some(Vec::new()))
            }
        });
        history.expect_mark_done().returning(|_| Ok(()));
        let waiter = waiter(history, MockIndicatorPort::new());

        let outcome = waiter
            .evaluate_detailed(&Instrument::from("MINT"), &test_config())
            .await;

        assert_eq!(outcome, BuyOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_failure_keeps_waiting() {
        let mut history = MockPriceHistoryPort::new();
        history
            .expect_register()
            .times(1)
            .returning(|_| Err(PriceHistoryError::Unavailable("redis down".into())));
        let fetches = AtomicUsize::new(0);
        history.expect_get_prices().returning(move |_| {
            let n = 10 + fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Some(vec![1.0; n]))
        });
        history
            .expect_mark_done()
            .times(1)
            .returning(|_| Err(PriceHistoryError::Unavailable("redis down".into())));
        let indicators = ScriptedIndicators::new()
            .with_fallback(neutral())
            .with_snapshot_at(11, oversold_cross());
        let waiter = waiter(history, indicators);

        assert!(waiter.evaluate(&Instrument::from("MINT"), &test_config()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_grace_aborts_on_first_late_tick() {
        let mut history = MockPriceHistoryPort::new();
        history.expect_register().returning(|_| Ok(()));
        history.expect_get_prices().returning(|_| Ok(Some(vec![1.0])));
        history.expect_mark_done().returning(|_| Ok(()));
        let waiter = waiter(history, ScriptedIndicators::new().with_fallback(neutral()));

        let config = SignalConfig {
            buy_signal_fraction_percentage_time_to_wait: 0.0,
            ..test_config()
        };

        let started = Instant::now();
        let outcome = waiter.evaluate_detailed(&Instrument::from("MINT"), &config).await;

        // elapsed must strictly exceed zero, so the first tick at t=0 passes
        assert_eq!(outcome, BuyOutcome::LowVolume { samples: 1 });
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_floored() {
        let mut history = MockPriceHistoryPort::new();
        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = fetches.clone();
        history.expect_register().returning(|_| Ok(()));
        history.expect_get_prices().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        });
        history.expect_mark_done().times(1).returning(|_| Ok(()));
        let waiter = waiter(history, ScriptedIndicators::new());

        let config = SignalConfig {
            buy_signal_time_to_wait_ms: 1_000,
            buy_signal_price_interval_ms: 0,
            ..test_config()
        };

        let outcome = waiter.evaluate_detailed(&Instrument::from("MINT"), &config).await;

        assert_eq!(outcome, BuyOutcome::TimedOut);
        let polls = fetches.load(Ordering::SeqCst);
        assert_eq!(polls as u128, 1_000 / MIN_POLL_INTERVAL.as_millis());
    }
}
