use tracing::debug;

use super::error::Result;
use super::partitions::{CURSOR_KEY, CURSOR_PARTITION, decode_cursor, encode_cursor};
use super::store::{DurableStore, WriteBatch};

/// Durable record of the highest item id processed so far
///
/// Monotonicity is the caller's job: compute `max(current, max_seen)` before
/// saving. A cycle that saw no items must not save at all.
pub struct CursorTracker<'a> {
    store: &'a DurableStore,
}

impl<'a> CursorTracker<'a> {
    pub fn new(store: &'a DurableStore) -> Self {
        Self { store }
    }

    /// Last recorded id, or 0 if none was ever saved
    pub fn load(&self) -> Result<u64> {
        let raw = self.store.view(|view| view.get(CURSOR_PARTITION, CURSOR_KEY))?;
        match raw {
            Some(bytes) => decode_cursor(&bytes),
            None => Ok(0),
        }
    }

    /// Persist a new cursor value in its own atomic commit
    pub fn save(&self, id: u64) -> Result<()> {
        self.store.update(|batch| Self::stage(batch, id))
    }

    /// Stage the cursor into a caller's batch
    pub fn stage(batch: &mut WriteBatch<'_>, id: u64) -> Result<()> {
        batch.put_partition(CURSOR_PARTITION)?;
        batch.insert(CURSOR_PARTITION, CURSOR_KEY, &encode_cursor(id))?;
        debug!(cursor = id, "Cursor staged");
        Ok(())
    }
}
