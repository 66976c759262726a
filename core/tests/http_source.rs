//! HTTP tests for the telemetry source against a mock server.
//!
//! The source wraps a blocking client that owns its own runtime. It is built,
//! used and dropped on the blocking pool, never on the test runtime.

use std::time::Duration;

use truckmon_core::telemetry::{
    FetchError, HttpTelemetrySource, RetryPolicy, TelemetrySource, fetch_with_retry,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TELEMETRY_PATH: &str = "/api/ets2/telemetry";
const FIXTURE: &str = include_str!("fixtures/telemetry.json");

fn url_for(server: &MockServer) -> String {
    format!("{}{}", server.uri(), TELEMETRY_PATH)
}

/// Build a source for `url` on the blocking pool and run `f` against it.
async fn with_source<T, F>(url: String, timeout: Duration, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce(&HttpTelemetrySource) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let source = HttpTelemetrySource::new(url, timeout).unwrap();
        f(&source)
    })
    .await
    .unwrap()
}

fn json_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(FIXTURE, "application/json")
}

fn quick_retries(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    }
}

#[tokio::test]
async fn test_fetch_decodes_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TELEMETRY_PATH))
        .respond_with(json_response())
        .expect(1)
        .mount(&server)
        .await;

    let payload = with_source(url_for(&server), Duration::from_secs(2), |s| s.fetch())
        .await
        .unwrap();

    assert_eq!(payload.truck.speed, 64.8);
    assert!(payload.truck.cruise_control_on);
    assert_eq!(payload.navigation.speed_limit, 90.0);
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = with_source(url_for(&server), Duration::from_secs(2), |s| s.fetch()).await;

    assert!(matches!(result, Err(FetchError::Status { status: 503 })));
}

#[tokio::test]
async fn test_malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"game\": {}}", "application/json"))
        .mount(&server)
        .await;

    let result = with_source(url_for(&server), Duration::from_secs(2), |s| s.fetch()).await;

    assert!(matches!(result, Err(FetchError::Decode(_))));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response().set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let result = with_source(url_for(&server), Duration::from_millis(50), |s| s.fetch()).await;

    assert!(matches!(result, Err(FetchError::Request { .. })));
}

#[tokio::test]
async fn test_unreachable_server_is_a_request_error() {
    let server = MockServer::start().await;
    let url = url_for(&server);
    drop(server);

    let result = with_source(url, Duration::from_millis(500), |s| s.fetch()).await;
    assert!(matches!(result, Err(FetchError::Request { .. })));
}

#[tokio::test]
async fn test_retry_recovers_after_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(json_response())
        .mount(&server)
        .await;

    let result = with_source(url_for(&server), Duration::from_secs(2), |s| {
        fetch_with_retry(s, &quick_retries(5))
    })
    .await;

    assert!(result.is_ok());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_retry_gives_up_after_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = with_source(url_for(&server), Duration::from_secs(2), |s| {
        fetch_with_retry(s, &quick_retries(4))
    })
    .await;

    match result {
        Err(FetchError::Exhausted { attempts, last }) => {
            assert_eq!(attempts, 4);
            assert!(matches!(*last, FetchError::Status { status: 500 }));
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}
