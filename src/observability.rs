//! Logging setup and poll-loop counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber
///
/// Filter comes from `RUST_LOG` (default `info`). Output goes to stderr so
/// that CSV written to stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Counters for poll cycles
#[derive(Debug, Default)]
pub struct Metrics {
    cycles_completed: AtomicU64,
    cycles_empty: AtomicU64,
    fetch_failures: AtomicU64,
    store_failures: AtomicU64,
    items_counted: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycle_completed(&self) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cycles_completed", "Metric incremented");
    }

    pub fn cycle_empty(&self) {
        self.cycles_empty.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cycles_empty", "Metric incremented");
    }

    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "fetch_failures", "Metric incremented");
    }

    pub fn store_failed(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "store_failures", "Metric incremented");
    }

    pub fn items_counted(&self, n: u64) {
        self.items_counted.fetch_add(n, Ordering::Relaxed);
        tracing::debug!(counter = "items_counted", n, "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_empty: self.cycles_empty.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            items_counted: self.items_counted.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles_completed: u64,
    pub cycles_empty: u64,
    pub fetch_failures: u64,
    pub store_failures: u64,
    pub items_counted: u64,
}
