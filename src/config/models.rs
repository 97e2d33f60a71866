use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

/// Store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/analytics")
}

/// Poll loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
    /// Sleep between cycles
    #[serde(default = "default_interval")]
    pub interval: HumanDuration,
    /// Maximum items requested per fetch
    #[serde(default = "default_batch_limit")]
    pub batch_limit: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            batch_limit: default_batch_limit(),
        }
    }
}

fn default_interval() -> HumanDuration {
    HumanDuration::from_secs(5 * 60)
}

fn default_batch_limit() -> u32 {
    200
}

/// Upper bound the timeline API accepts for `count`
pub const MAX_BATCH_LIMIT: u32 = 200;

/// Timeline API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimelineConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeline_path")]
    pub path: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Bearer token (loaded from environment or CLI, not from config file)
    #[serde(skip)]
    pub bearer_token: Option<String>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_timeline_path(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            bearer_token: None,
        }
    }
}

impl TimelineConfig {
    /// Full endpoint URL
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }
}

fn default_base_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_timeline_path() -> String {
    "/1.1/statuses/home_timeline.json".to_string()
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("dailytally/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.path, PathBuf::from("data/analytics"));
        assert_eq!(config.poll.interval.as_duration(), Duration::from_secs(300));
        assert_eq!(config.poll.batch_limit, 200);
        assert_eq!(
            config.timeline.endpoint(),
            "https://api.twitter.com/1.1/statuses/home_timeline.json"
        );
        assert!(config.timeline.bearer_token.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[poll]
interval = "30s"

[timeline]
base_url = "http://localhost:9000/"
            "#,
        )
        .unwrap();

        assert_eq!(config.poll.interval.as_duration(), Duration::from_secs(30));
        assert_eq!(config.poll.batch_limit, 200);
        assert_eq!(
            config.timeline.endpoint(),
            "http://localhost:9000/1.1/statuses/home_timeline.json"
        );
    }

    #[test]
    fn test_bearer_token_not_read_from_file() {
        let config: Config = toml::from_str(
            r#"
[timeline]
bearer_token = "leaked"
            "#,
        )
        .unwrap();

        assert!(config.timeline.bearer_token.is_none());
    }
}
