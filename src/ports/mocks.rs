//! Hand-rolled port fakes that record calls and replay scripted responses
//!
//! Built for unit tests and behind the `test-util` feature for integration
//! tests, where a mockall expectation set would be noisier than a scripted stub.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{IndicatorSnapshot, Instrument, MacdValues};
use super::indicators::{IndicatorError, IndicatorPort};
use super::notifier::{NotifierError, NotifierPort};
use super::quote::{QuoteError, QuotePort};

/// Indicator fake keyed by price sequence length
///
/// Sequences with no scripted length get the fallback snapshot
/// (uncomputed by default).
#[derive(Debug, Clone)]
pub struct ScriptedIndicators {
    by_len: Arc<Mutex<HashMap<usize, IndicatorSnapshot>>>,
    fallback: IndicatorSnapshot,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl Default for ScriptedIndicators {
    fn default() -> Self {
        Self {
            by_len: Arc::default(),
            fallback: IndicatorSnapshot::new(0.0, MacdValues::absent()),
            calls: Arc::default(),
        }
    }
}

impl ScriptedIndicators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot to report once the sequence holds exactly `len` prices
    pub fn with_snapshot_at(self, len: usize, snapshot: IndicatorSnapshot) -> Self {
        self.by_len.lock().unwrap().insert(len, snapshot);
        self
    }

    /// Snapshot for every unscripted length
    pub fn with_fallback(mut self, snapshot: IndicatorSnapshot) -> Self {
        self.fallback = snapshot;
        self
    }

    /// Sequence lengths seen by `rsi`, one per evaluation
    pub fn get_calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }

    fn lookup(&self, len: usize) -> IndicatorSnapshot {
        self.by_len
            .lock()
            .unwrap()
            .get(&len)
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl IndicatorPort for ScriptedIndicators {
    fn rsi(&self, prices: &[f64]) -> Result<f64, IndicatorError> {
        self.calls.lock().unwrap().push(prices.len());
        Ok(self.lookup(prices.len()).rsi)
    }

    fn macd(&self, prices: &[f64]) -> Result<MacdValues, IndicatorError> {
        Ok(self.lookup(prices.len()).macd())
    }
}

/// Quote fake replaying responses in order; the last one repeats
#[derive(Debug, Clone, Default)]
pub struct ScriptedQuotes {
    responses: Arc<Mutex<VecDeque<Result<u64, String>>>>,
    calls: Arc<Mutex<Vec<(Instrument, u64, Decimal)>>>,
}

impl ScriptedQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_quote(self, amount: u64) -> Self {
        self.responses.lock().unwrap().push_back(Ok(amount));
        self
    }

    pub fn then_fail(self, reason: &str) -> Self {
        self.responses.lock().unwrap().push_back(Err(reason.to_string()));
        self
    }

    pub fn get_calls(&self) -> Vec<(Instrument, u64, Decimal)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuotePort for ScriptedQuotes {
    async fn quote(
        &self,
        instrument: &Instrument,
        input_amount: u64,
        slippage_pct: Decimal,
    ) -> Result<u64, QuoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((instrument.clone(), input_amount, slippage_pct));

        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };

        match next {
            Some(Ok(amount)) => Ok(amount),
            Some(Err(reason)) => Err(QuoteError::ApiError(reason)),
            None => Err(QuoteError::NoRoute(instrument.to_string())),
        }
    }
}

/// Notifier fake recording every message; optionally failing delivery
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, Instrument)>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the message but report a delivery failure
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn get_sent(&self) -> Vec<(String, Instrument)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifierPort for RecordingNotifier {
    async fn send(&self, message: &str, instrument: &Instrument) -> Result<(), NotifierError> {
        self.sent
            .lock()
            .unwrap()
            .push((message.to_string(), instrument.clone()));

        if self.fail {
            return Err(NotifierError::DeliveryFailed("scripted failure".into()));
        }
        Ok(())
    }
}
