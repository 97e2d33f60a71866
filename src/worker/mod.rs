//! Poll worker
//!
//! Fetches new timeline items on a fixed interval and folds them into the
//! durable daily counters. See [`PollLoop`] for the cycle itself.

pub mod http;
pub mod runner;
pub mod timeline;

use std::time::Duration;

use crate::config::PollConfig;

pub use http::HttpTimeline;
pub use runner::{CycleError, CycleOutcome, PollLoop};
pub use timeline::{FetchError, TimelineItem, TimelineSource};

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub interval: Duration,
    pub batch_limit: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            batch_limit: 200,
        }
    }
}

impl From<&PollConfig> for WorkerConfig {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: config.interval.as_duration(),
            batch_limit: config.batch_limit,
        }
    }
}
