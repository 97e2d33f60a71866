//! Poll cycle: fetch, count, commit

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use super::WorkerConfig;
use super::timeline::{TimelineItem, TimelineSource};
use crate::humanize::HumanDuration;
use crate::ledger::{CursorTracker, DailyCounters, DayLabel, DurableStore, StoreError};
use crate::observability::{Metrics, MetricsSnapshot};

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, CycleError>;

/// What a single cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetch failed; nothing was written
    FetchFailed,
    /// No new items; nothing was written
    Empty { cursor: u64 },
    /// Counts and cursor committed together
    Counted { items: usize, cursor: u64 },
}

/// Drives fetch -> count -> commit cycles against one store
pub struct PollLoop<S> {
    store: DurableStore,
    source: S,
    config: WorkerConfig,
    metrics: Arc<Metrics>,
}

impl<S: TimelineSource> PollLoop<S> {
    pub fn new(store: DurableStore, source: S, config: WorkerConfig) -> Self {
        Self {
            store,
            source,
            config,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn store(&self) -> &DurableStore {
        &self.store
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Run one cycle attributing every fetched item to `day`
    ///
    /// The working copy of the day's counts and the cursor are reloaded from
    /// the store first. New counts and the advanced cursor are committed in
    /// one atomic batch, so a crash loses at most the current cycle.
    pub async fn run_cycle(&self, day: DayLabel) -> Result<CycleOutcome> {
        let mut counts = DailyCounters::load(&self.store, day)?;
        let cursor = CursorTracker::new(&self.store).load()?;
        info!(%day, cursor, "Last indexed item");

        let items = match self.source.fetch_since(cursor, self.config.batch_limit).await {
            Ok(items) => items,
            Err(e) => {
                warn!(cursor, error = %e, "Timeline fetch failed, skipping cycle");
                self.metrics.fetch_failed();
                return Ok(CycleOutcome::FetchFailed);
            }
        };

        let accepted = accept_items(&items, cursor);
        if accepted.is_empty() {
            info!(cursor, "No new items since last cycle");
            self.metrics.cycle_empty();
            return Ok(CycleOutcome::Empty { cursor });
        }

        let mut next_cursor = cursor;
        for item in &accepted {
            counts.increment(&item.author);
            next_cursor = next_cursor.max(item.id);
        }

        self.store.update(|batch| {
            counts.stage(batch)?;
            CursorTracker::stage(batch, next_cursor)
        })?;

        self.metrics.items_counted(accepted.len() as u64);
        self.metrics.cycle_completed();
        info!(
            %day,
            items = accepted.len(),
            authors = counts.len(),
            cursor = next_cursor,
            "Cycle committed"
        );

        Ok(CycleOutcome::Counted {
            items: accepted.len(),
            cursor: next_cursor,
        })
    }

    /// Cycle forever, sleeping `interval` between cycles, until `shutdown`
    /// resolves. No cycle failure stops the loop.
    pub async fn run<F>(self, shutdown: F) -> MetricsSnapshot
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let interval = HumanDuration(self.config.interval);
        info!(%interval, limit = self.config.batch_limit, "Poll loop started");

        loop {
            let day = DayLabel::today();

            tokio::select! {
                result = self.run_cycle(day) => {
                    if let Err(e) = result {
                        error!(%day, error = %e, "Cycle failed, nothing committed");
                        self.metrics.store_failed();
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested mid-cycle, uncommitted counts dropped");
                    break;
                }
            }

            info!(%interval, "Sleeping until next cycle");
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = &mut shutdown => break,
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(?snapshot, "Poll loop stopped");
        snapshot
    }
}

/// Drop items a source should never have returned
///
/// With a cursor in place, anything at or below it was already counted.
/// Items without an author cannot be keyed.
fn accept_items(items: &[TimelineItem], cursor: u64) -> Vec<&TimelineItem> {
    items
        .iter()
        .filter(|item| {
            if cursor > 0 && item.id <= cursor {
                warn!(id = item.id, cursor, "Item at or below cursor, not counted");
                return false;
            }
            if item.author.is_empty() {
                warn!(id = item.id, "Item without author, not counted");
                return false;
            }
            true
        })
        .collect()
}
