//! Fjall-based persistence for daily post counts and the fetch cursor
//!
//! Everything durable lives in one store directory:
//!
//! - one partition per calendar day (`dailycount_YYYY-MM-DD`) mapping
//!   screen name -> post count
//! - the `lastindexedtweet` partition holding the highest processed item id
//! - an internal catalog of created partitions
//!
//! [`DailyCounters`] and [`CursorTracker`] hold no authoritative state; the
//! poll loop reloads them from the [`DurableStore`] at the start of every
//! cycle and writes them back together in a single atomic batch.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dailytally::ledger::{CursorTracker, DailyCounters, DayLabel, DurableStore};
//!
//! let store = DurableStore::open("data/analytics")?;
//! let mut counts = DailyCounters::load(&store, DayLabel::today())?;
//! counts.increment("alice");
//! store.update(|batch| {
//!     counts.stage(batch)?;
//!     CursorTracker::stage(batch, 42)
//! })?;
//! ```

pub mod counters;
pub mod cursor;
pub mod error;
pub mod partitions;
pub mod store;

pub use counters::DailyCounters;
pub use cursor::CursorTracker;
pub use error::{Result, StoreError};
pub use partitions::DayLabel;
pub use store::{DurableStore, PartitionEntries, ReadView, WriteBatch};
