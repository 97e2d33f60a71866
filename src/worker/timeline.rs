use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Fetch errors; the poll loop treats every variant as "no items this cycle"
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// One timeline post, reduced to what counting needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineItem {
    pub id: u64,
    pub author: String,
}

impl TimelineItem {
    pub fn new(id: u64, author: impl Into<String>) -> Self {
        Self {
            id,
            author: author.into(),
        }
    }
}

/// Source of timeline items newer than a cursor
///
/// Implementations must only return items with `id > since_id` when
/// `since_id > 0`, and at most `limit` of them. Zero items is a valid answer.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    async fn fetch_since(&self, since_id: u64, limit: u32) -> Result<Vec<TimelineItem>>;
}

/// Wire shape of a status in a home-timeline response
#[derive(Debug, Deserialize)]
pub(crate) struct Status {
    pub id: u64,
    pub user: StatusUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUser {
    pub screen_name: String,
}

impl From<Status> for TimelineItem {
    fn from(status: Status) -> Self {
        TimelineItem {
            id: status.id,
            author: status.user.screen_name,
        }
    }
}

/// Parse a JSON array of statuses
pub(crate) fn parse_statuses(body: &[u8]) -> Result<Vec<TimelineItem>> {
    let statuses: Vec<Status> =
        serde_json::from_slice(body).map_err(|e| FetchError::InvalidBody(e.to_string()))?;
    Ok(statuses.into_iter().map(TimelineItem::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statuses() {
        let body = br#"[
            {"id": 9, "text": "hi", "user": {"screen_name": "alice", "id": 1}},
            {"id": 7, "user": {"screen_name": "bob"}}
        ]"#;

        let items = parse_statuses(body).unwrap();
        assert_eq!(
            items,
            vec![TimelineItem::new(9, "alice"), TimelineItem::new(7, "bob")]
        );
    }

    #[test]
    fn test_parse_large_ids() {
        let body = br#"[{"id": 1750000000000000000, "user": {"screen_name": "alice"}}]"#;
        let items = parse_statuses(body).unwrap();
        assert_eq!(items[0].id, 1_750_000_000_000_000_000);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_statuses(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(matches!(
            parse_statuses(br#"{"errors": [{"code": 89}]}"#),
            Err(FetchError::InvalidBody(_))
        ));
    }
}
