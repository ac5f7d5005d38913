//! Shared ads counter
//!
//! Lock-free reads; every write updates the gauge and the state file.

use metrics::{Counter, Gauge};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::error;

use crate::state::StateStore;

/// Metric handles published by the counter
#[derive(Clone)]
pub struct CounterMetrics {
    /// Current value
    pub ads_count: Gauge,
    /// Random mutations applied
    pub mutations: Counter,
}

impl CounterMetrics {
    /// Handles registered against the installed recorder
    pub fn registered() -> Self {
        Self {
            ads_count: metrics::gauge!(crate::metrics::ADS_COUNT_GAUGE),
            mutations: metrics::counter!(crate::metrics::ADS_MUTATIONS_COUNTER),
        }
    }

    /// Handles that record nothing
    pub fn noop() -> Self {
        Self {
            ads_count: Gauge::noop(),
            mutations: Counter::noop(),
        }
    }
}

/// Owns the in-memory ads counter
pub struct AdsService {
    ads_count: AtomicU32,
    metrics: CounterMetrics,
    store: StateStore,
}

impl AdsService {
    /// Build the service from the last persisted value (or a random fallback)
    pub fn restore(store: StateStore, metrics: CounterMetrics) -> Arc<Self> {
        let initial = store.restore();
        metrics.ads_count.set(initial as f64);

        Arc::new(Self {
            ads_count: AtomicU32::new(initial),
            metrics,
            store,
        })
    }

    /// Current counter value
    #[inline]
    pub fn get(&self) -> u32 {
        self.ads_count.load(Ordering::Acquire)
    }

    /// Store `value`, publish it to the gauge and persist it
    pub fn set(&self, value: u32) {
        self.ads_count.store(value, Ordering::Release);
        self.metrics.ads_count.set(value as f64);
        self.store.save(value);
    }

    /// Persist the current value without changing it
    pub fn persist(&self) {
        self.store.save(self.get());
    }

    /// `set` on the blocking pool, for callers on async worker threads
    pub async fn set_async(self: &Arc<Self>, value: u32) {
        let service = Arc::clone(self);
        if let Err(e) = tokio::task::spawn_blocking(move || service.set(value)).await {
            error!(error = %e, ads_count = value, "Ads count update task failed");
        }
    }

    /// `persist` on the blocking pool, for callers on async worker threads
    pub async fn persist_async(self: &Arc<Self>) {
        let service = Arc::clone(self);
        if let Err(e) = tokio::task::spawn_blocking(move || service.persist()).await {
            error!(error = %e, "State save task failed");
        }
    }

    /// Upper bound (inclusive) of values produced by random mutation
    pub fn max_value(&self) -> u32 {
        self.store.max_value()
    }

    pub(crate) fn record_mutation(&self) {
        self.metrics.mutations.increment(1);
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }
}
