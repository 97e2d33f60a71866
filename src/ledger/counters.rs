use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::error::Result;
use super::partitions::{DayLabel, decode_count, encode_count};
use super::store::{DurableStore, WriteBatch};

/// Working copy of one day's per-author post counts
///
/// The store is authoritative: a cycle reloads this map at its start and
/// writes it back in full once its items are counted. Counts saturate at
/// `u16::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCounters {
    day: DayLabel,
    counts: BTreeMap<String, u16>,
}

impl DailyCounters {
    /// Empty working copy that is not backed by a partition yet
    pub fn new(day: DayLabel) -> Self {
        Self {
            day,
            counts: BTreeMap::new(),
        }
    }

    /// Load the day's counts, creating the day partition if absent
    pub fn load(store: &DurableStore, day: DayLabel) -> Result<Self> {
        let partition = day.partition_name();
        store.update(|batch| batch.put_partition(&partition))?;

        let entries = store.get_partition(&partition)?.unwrap_or_default();
        let mut counts = BTreeMap::new();
        for (key, value) in entries {
            let count = decode_count(&partition, &key, &value)?;
            counts.insert(String::from_utf8_lossy(&key).into_owned(), count);
        }

        debug!(day = %day, authors = counts.len(), "Daily counts loaded");
        Ok(Self { day, counts })
    }

    pub fn day(&self) -> DayLabel {
        self.day
    }

    /// Bump `author` by one, starting at 1; returns the new count
    pub fn increment(&mut self, author: &str) -> u16 {
        let count = self.counts.entry(author.to_string()).or_insert(0);
        if *count == u16::MAX {
            warn!(day = %self.day, author, "Daily count saturated");
        }
        *count = count.saturating_add(1);
        *count
    }

    pub fn get(&self, author: &str) -> Option<u16> {
        self.counts.get(author).copied()
    }

    pub fn counts(&self) -> &BTreeMap<String, u16> {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Write every (author, count) pair to the day partition
    pub fn flush(&self, store: &DurableStore) -> Result<()> {
        store.update(|batch| self.stage(batch))
    }

    /// Stage every (author, count) pair into a caller's batch
    pub fn stage(&self, batch: &mut WriteBatch<'_>) -> Result<()> {
        let partition = self.day.partition_name();
        batch.put_partition(&partition)?;
        for (author, count) in &self.counts {
            batch.insert(&partition, author.as_bytes(), &encode_count(*count))?;
        }
        debug!(day = %self.day, authors = self.counts.len(), "Daily counts staged");
        Ok(())
    }
}
