//! HTTP client for the home-timeline endpoint

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::timeline::{FetchError, Result, TimelineItem, TimelineSource, parse_statuses};
use crate::config::TimelineConfig;

/// Timeline source backed by a `GET {base_url}{path}` JSON endpoint
pub struct HttpTimeline {
    client: Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl HttpTimeline {
    /// Create a new HTTP timeline client
    pub fn new(config: &TimelineConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        reqwest::Url::parse(&endpoint)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout.as_duration())
            .timeout(config.request_timeout.as_duration())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            bearer_token: config.bearer_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Query parameters; `since_id` is omitted when there is no cursor yet
fn query_params(since_id: u64, limit: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![("count", limit.to_string())];
    if since_id > 0 {
        params.push(("since_id", since_id.to_string()));
    }
    params
}

#[async_trait]
impl TimelineSource for HttpTimeline {
    async fn fetch_since(&self, since_id: u64, limit: u32) -> Result<Vec<TimelineItem>> {
        debug!(endpoint = %self.endpoint, since_id, limit, "Fetching timeline");

        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&query_params(since_id, limit));

        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::RequestFailed(format!("Failed to read body: {}", e))
            }
        })?;

        let items = parse_statuses(&body)?;
        debug!(count = items.len(), size = body.len(), "Timeline fetched");

        Ok(items)
    }
}
