//! HttpTimeline against a local mock timeline server

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use tempfile::TempDir;

use dailytally::config::{HumanDuration, TimelineConfig};
use dailytally::ledger::{CursorTracker, DailyCounters, DayLabel, DurableStore};
use dailytally::worker::{
    CycleOutcome, FetchError, HttpTimeline, PollLoop, TimelineItem, TimelineSource, WorkerConfig,
};

const TIMELINE_PATH: &str = "/1.1/statuses/home_timeline.json";

/// Requests seen by the mock server: (query, authorization header)
type Seen = Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>;

#[derive(Clone)]
struct MockState {
    seen: Seen,
    statuses: Value,
}

async fn home_timeline(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state.seen.lock().unwrap().push((query.clone(), auth));

    // Honour since_id the way the real endpoint does
    let since: u64 = query
        .get("since_id")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let filtered: Vec<Value> = state
        .statuses
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|s| s["id"].as_u64().unwrap_or(0) > since)
        .collect();

    Json(Value::Array(filtered))
}

async fn rate_limited() -> impl IntoResponse {
    (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded")
}

async fn garbage() -> impl IntoResponse {
    (StatusCode::OK, "<html>not json</html>")
}

async fn start_mock_server(statuses: Value) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let state = MockState {
        seen: Arc::clone(&seen),
        statuses,
    };

    let app = Router::new()
        .route(TIMELINE_PATH, get(home_timeline))
        .route("/limited.json", get(rate_limited))
        .route("/garbage.json", get(garbage))
        .with_state(state);

    // Bind to random available port
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let bound_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", bound_addr), seen)
}

fn timeline_config(base_url: &str, path: &str, token: Option<&str>) -> TimelineConfig {
    TimelineConfig {
        base_url: base_url.to_string(),
        path: path.to_string(),
        request_timeout: HumanDuration(Duration::from_secs(5)),
        bearer_token: token.map(String::from),
        ..TimelineConfig::default()
    }
}

fn sample_statuses() -> Value {
    json!([
        {"id": 9, "text": "third", "user": {"screen_name": "alice"}},
        {"id": 7, "text": "second", "user": {"screen_name": "bob"}},
        {"id": 5, "text": "first", "user": {"screen_name": "alice"}}
    ])
}

#[tokio::test]
async fn test_fetch_without_cursor() {
    let (base_url, seen) = start_mock_server(sample_statuses()).await;
    let timeline = HttpTimeline::new(&timeline_config(&base_url, TIMELINE_PATH, Some("secret"))).unwrap();

    let items = timeline.fetch_since(0, 200).await.unwrap();
    assert_eq!(
        items,
        vec![
            TimelineItem::new(9, "alice"),
            TimelineItem::new(7, "bob"),
            TimelineItem::new(5, "alice"),
        ]
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (query, auth) = &seen[0];
    assert_eq!(query.get("count").map(String::as_str), Some("200"));
    assert!(!query.contains_key("since_id"));
    assert_eq!(auth.as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn test_fetch_with_cursor() {
    let (base_url, seen) = start_mock_server(sample_statuses()).await;
    let timeline = HttpTimeline::new(&timeline_config(&base_url, TIMELINE_PATH, None)).unwrap();

    let items = timeline.fetch_since(7, 50).await.unwrap();
    assert_eq!(items, vec![TimelineItem::new(9, "alice")]);

    let seen = seen.lock().unwrap();
    let (query, auth) = &seen[0];
    assert_eq!(query.get("since_id").map(String::as_str), Some("7"));
    assert_eq!(query.get("count").map(String::as_str), Some("50"));
    assert!(auth.is_none());
}

#[tokio::test]
async fn test_error_status() {
    let (base_url, _seen) = start_mock_server(json!([])).await;
    let timeline = HttpTimeline::new(&timeline_config(&base_url, "/limited.json", None)).unwrap();

    match timeline.fetch_since(0, 200).await {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 429),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_body() {
    let (base_url, _seen) = start_mock_server(json!([])).await;
    let timeline = HttpTimeline::new(&timeline_config(&base_url, "/garbage.json", None)).unwrap();

    assert!(matches!(
        timeline.fetch_since(0, 200).await,
        Err(FetchError::InvalidBody(_))
    ));
}

#[tokio::test]
async fn test_unreachable_server() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let timeline =
        HttpTimeline::new(&timeline_config(&format!("http://{}", addr), TIMELINE_PATH, None))
            .unwrap();

    assert!(timeline.fetch_since(0, 200).await.is_err());
}

#[tokio::test]
async fn test_poll_cycles_over_http() {
    let (base_url, seen) = start_mock_server(sample_statuses()).await;
    let temp_dir = TempDir::new().unwrap();
    let store = DurableStore::open(temp_dir.path().join("tally")).unwrap();
    let timeline = HttpTimeline::new(&timeline_config(&base_url, TIMELINE_PATH, None)).unwrap();
    let worker = PollLoop::new(store, timeline, WorkerConfig::default());
    let label: DayLabel = "2024-01-01".parse().unwrap();

    let first = worker.run_cycle(label).await.unwrap();
    assert_eq!(first, CycleOutcome::Counted { items: 3, cursor: 9 });

    // The server filters by since_id, so the second cycle sees nothing new
    let second = worker.run_cycle(label).await.unwrap();
    assert_eq!(second, CycleOutcome::Empty { cursor: 9 });

    let counts = DailyCounters::load(worker.store(), label).unwrap();
    assert_eq!(counts.get("alice"), Some(2));
    assert_eq!(counts.get("bob"), Some(1));
    assert_eq!(CursorTracker::new(worker.store()).load().unwrap(), 9);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[1].0.get("since_id").map(String::as_str), Some("9"));
}
