//! In-Memory Price History
//!
//! Per-instrument price accumulation shared between the price feed (which
//! calls `record_price`) and the signal waiters (which register, mark done
//! and read). Sequences are append-only while tracking is active; once an
//! instrument is marked done new prices are dropped until it is registered
//! again.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::Instrument;
use crate::ports::{PriceHistoryError, PriceHistoryPort};

/// Tracking state for one instrument
#[derive(Debug, Clone)]
pub struct TrackedPrices {
    /// Observed prices in arrival order
    pub prices: Vec<f64>,
    /// Entry tracking finished, no further appends
    pub done: bool,
    /// When tracking (last) started
    pub registered_at: DateTime<Utc>,
}

impl TrackedPrices {
    fn new() -> Self {
        Self {
            prices: Vec::new(),
            done: false,
            registered_at: Utc::now(),
        }
    }
}

/// Shared in-memory price history, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceHistory {
    entries: Arc<RwLock<HashMap<Instrument, TrackedPrices>>>,
    /// Per-instrument cap, oldest prices dropped beyond it (0 = unbounded)
    max_samples: usize,
}

impl InMemoryPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap each sequence at `max_samples` prices
    pub fn with_max_samples(max_samples: usize) -> Self {
        Self {
            entries: Arc::default(),
            max_samples,
        }
    }

    /// Append an observed price. Returns false if the instrument is not
    /// actively tracked or the price is not a positive finite number.
    pub async fn record_price(&self, instrument: &Instrument, price: f64) -> bool {
        if !price.is_finite() || price <= 0.0 {
            tracing::trace!("Dropping invalid price {} for {}", price, instrument.short());
            return false;
        }

        let mut entries = self.entries.write().await;
        match entries.get_mut(instrument) {
            Some(tracked) if !tracked.done => {
                tracked.prices.push(price);
                if self.max_samples > 0 && tracked.prices.len() > self.max_samples {
                    let excess = tracked.prices.len() - self.max_samples;
                    tracked.prices.drain(..excess);
                }
                true
            }
            _ => false,
        }
    }

    /// Registered and not yet marked done
    pub async fn is_tracking(&self, instrument: &Instrument) -> bool {
        self.entries
            .read()
            .await
            .get(instrument)
            .map(|tracked| !tracked.done)
            .unwrap_or(false)
    }

    /// Number of actively tracked instruments
    pub async fn tracked_count(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|tracked| !tracked.done)
            .count()
    }

    /// Snapshot of an instrument's tracking state
    pub async fn get_entry(&self, instrument: &Instrument) -> Option<TrackedPrices> {
        self.entries.read().await.get(instrument).cloned()
    }

    /// Drop every instrument marked done, returning how many were removed
    pub async fn prune_done(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, tracked| !tracked.done);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("Pruned {} finished price histories", removed);
        }
        removed
    }
}

#[async_trait]
impl PriceHistoryPort for InMemoryPriceHistory {
    async fn register(&self, instrument: &Instrument) -> Result<(), PriceHistoryError> {
        let mut entries = self.entries.write().await;
        let tracked = entries
            .entry(instrument.clone())
            .or_insert_with(TrackedPrices::new);

        // Re-registering a finished instrument starts a fresh sequence
        if tracked.done {
            *tracked = TrackedPrices::new();
        }
        tracing::debug!("Tracking prices for {}", instrument.short());
        Ok(())
    }

    async fn mark_done(&self, instrument: &Instrument) -> Result<(), PriceHistoryError> {
        if let Some(tracked) = self.entries.write().await.get_mut(instrument) {
            tracked.done = true;
        }
        Ok(())
    }

    async fn get_prices(
        &self,
        instrument: &Instrument,
    ) -> Result<Option<Vec<f64>>, PriceHistoryError> {
        Ok(self
            .entries
            .read()
            .await
            .get(instrument)
            .filter(|tracked| !tracked.prices.is_empty())
            .map(|tracked| tracked.prices.clone()))
    }
}
