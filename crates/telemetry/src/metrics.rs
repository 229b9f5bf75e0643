//! In-process metrics for the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.inc_by(1);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge that can move in both directions.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        // Saturate rather than wrap if accounting ever drifts.
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(1))
            });
    }
}

/// Millisecond latency histogram with fixed bucket bounds.
#[derive(Debug)]
pub struct Histogram {
    buckets: [AtomicU64; 9],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    const BOUNDS_MS: [u64; 9] = [1, 5, 10, 50, 100, 500, 1000, 5000, 30000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BOUNDS_MS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BOUNDS_MS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Collected metrics for the campaign engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Queue accounting
    pub jobs_enqueued: Counter,
    pub jobs_completed: Counter,
    pub jobs_failed: Counter,
    pub queue_depth: Gauge,

    // Customer ingestion
    pub customer_batches: Counter,
    pub customers_upserted: Counter,
    pub addresses_upserted: Counter,

    // Order ingestion
    pub order_batches: Counter,
    pub orders_upserted: Counter,
    pub orders_skipped: Counter,
    pub items_upserted: Counter,

    // Campaign delivery
    pub campaigns_completed: Counter,
    pub messages_sent: Counter,
    pub messages_failed: Counter,
    pub receipts_applied: Counter,

    // Latency
    pub job_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            jobs_enqueued: self.jobs_enqueued.get(),
            jobs_completed: self.jobs_completed.get(),
            jobs_failed: self.jobs_failed.get(),
            queue_depth: self.queue_depth.get(),
            customer_batches: self.customer_batches.get(),
            customers_upserted: self.customers_upserted.get(),
            addresses_upserted: self.addresses_upserted.get(),
            order_batches: self.order_batches.get(),
            orders_upserted: self.orders_upserted.get(),
            orders_skipped: self.orders_skipped.get(),
            items_upserted: self.items_upserted.get(),
            campaigns_completed: self.campaigns_completed.get(),
            messages_sent: self.messages_sent.get(),
            messages_failed: self.messages_failed.get(),
            receipts_applied: self.receipts_applied.get(),
            job_latency_mean_ms: self.job_latency_ms.mean(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub jobs_enqueued: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub queue_depth: u64,
    pub customer_batches: u64,
    pub customers_upserted: u64,
    pub addresses_upserted: u64,
    pub order_batches: u64,
    pub orders_upserted: u64,
    pub orders_skipped: u64,
    pub items_upserted: u64,
    pub campaigns_completed: u64,
    pub messages_sent: u64,
    pub messages_failed: u64,
    pub receipts_applied: u64,
    pub job_latency_mean_ms: f64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
