use super::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// --- SQLite backend ---

#[tokio::test]
async fn test_sqlite_increment_counts_sequentially() {
    let store = SqliteVisitorStore::open_in_memory().unwrap();

    for expected in 1..=5u64 {
        assert_eq!(store.increment("widget").await.unwrap(), expected);
    }
    assert_eq!(store.get("widget").await.unwrap(), 5);

    // A different slug is unaffected.
    assert_eq!(store.get("gadget").await.unwrap(), 0);
    assert_eq!(store.increment("gadget").await.unwrap(), 1);
    assert_eq!(store.get("widget").await.unwrap(), 5);
}

#[tokio::test]
async fn test_sqlite_unknown_slug_reads_zero() {
    let store = SqliteVisitorStore::open_in_memory().unwrap();
    assert_eq!(store.get("never-seen").await.unwrap(), 0);
}

#[tokio::test]
async fn test_sqlite_top_orders_descending_and_caps() {
    let store = SqliteVisitorStore::open_in_memory().unwrap();
    for _ in 0..3 {
        store.increment("alpha").await.unwrap();
    }
    for _ in 0..7 {
        store.increment("beta").await.unwrap();
    }
    store.increment("gamma").await.unwrap();

    let top = store.top(2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].slug, "beta");
    assert_eq!(top[0].count, 7);
    assert_eq!(top[1].slug, "alpha");
}

#[tokio::test]
async fn test_sqlite_stats() {
    let store = SqliteVisitorStore::open_in_memory().unwrap();
    for _ in 0..4 {
        store.increment("alpha").await.unwrap();
    }
    for _ in 0..2 {
        store.increment("beta").await.unwrap();
    }

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_projects, 2);
    assert_eq!(stats.total_visitors, 6);
    assert!((stats.average_visitors - 3.0).abs() < f64::EPSILON);
    assert_eq!(stats.top_project.unwrap().slug, "alpha");
}

#[tokio::test]
async fn test_sqlite_stats_on_empty_store() {
    let store = SqliteVisitorStore::open_in_memory().unwrap();
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_projects, 0);
    assert_eq!(stats.total_visitors, 0);
    assert!(stats.top_project.is_none());
}

#[tokio::test]
async fn test_sqlite_reset() {
    let store = SqliteVisitorStore::open_in_memory().unwrap();
    store.increment("widget").await.unwrap();
    store.increment("widget").await.unwrap();

    store.reset("widget").await.unwrap();
    assert_eq!(store.get("widget").await.unwrap(), 0);

    // Counting resumes from zero.
    assert_eq!(store.increment("widget").await.unwrap(), 1);
}

#[tokio::test]
async fn test_sqlite_records_visit_timestamps() {
    let store = SqliteVisitorStore::open_in_memory().unwrap();
    store.increment("widget").await.unwrap();

    let records = store.all(10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].first_visited.is_some());
    assert!(records[0].last_visited.is_some());
}

// --- Counter service backend ---

#[tokio::test]
async fn test_counter_api_increment() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fossradar/visitor-widget/up"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 42 })))
        .mount(&mock_server)
        .await;

    let store = CounterApiStore::new(mock_server.uri(), "fossradar", None).unwrap();
    assert_eq!(store.increment("widget").await.unwrap(), 42);
}

#[tokio::test]
async fn test_counter_api_accepts_value_field() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fossradar/visitor-widget"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 7 })))
        .mount(&mock_server)
        .await;

    let store = CounterApiStore::new(mock_server.uri(), "fossradar", None).unwrap();
    assert_eq!(store.get("widget").await.unwrap(), 7);
}

#[tokio::test]
async fn test_counter_api_missing_counter_reads_zero() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fossradar/visitor-unknown"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let store = CounterApiStore::new(mock_server.uri(), "fossradar", None).unwrap();
    assert_eq!(store.get("unknown").await.unwrap(), 0);
}

#[tokio::test]
async fn test_counter_api_increment_failure_propagates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fossradar/visitor-widget/up"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let store = CounterApiStore::new(mock_server.uri(), "fossradar", None).unwrap();
    assert!(matches!(
        store.increment("widget").await,
        Err(VisitorError::Http(_))
    ));
}

#[tokio::test]
async fn test_counter_api_aggregates_are_not_supported() {
    let store = CounterApiStore::new("http://127.0.0.1:9", "fossradar", None).unwrap();

    assert!(matches!(store.top(10).await, Err(VisitorError::NotSupported)));
    assert!(matches!(store.all(10).await, Err(VisitorError::NotSupported)));
    assert!(matches!(store.stats().await, Err(VisitorError::NotSupported)));
}
