//! Configuration management for dailytally
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! Command-line flags are applied on top by the binary.
//!
//! # Usage
//!
//! ```no_run
//! use dailytally::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Polling every {}", config.poll.interval);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `DAILYTALLY__<section>__<key>`
//!
//! Examples:
//! - `DAILYTALLY__STORE__PATH=/var/lib/dailytally`
//! - `DAILYTALLY__POLL__INTERVAL=10m`
//! - `DAILYTALLY__TIMELINE__BASE_URL=http://localhost:9000`
//!
//! The API bearer token is only ever read from `TWITTER_BEARER_TOKEN`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/dailytally.toml`.
//! This can be overridden using the `DAILYTALLY_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use crate::humanize::HumanDuration;
pub use models::{Config, MAX_BATCH_LIMIT, PollConfig, StoreConfig, TimelineConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`DAILYTALLY__*`, `TWITTER_BEARER_TOKEN`)
    /// 2. TOML file (default: `config/dailytally.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load(Some(path))?;
        config.validate()?;
        Ok(config)
    }

    /// Re-check invariants, e.g. after CLI overrides were applied
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}
