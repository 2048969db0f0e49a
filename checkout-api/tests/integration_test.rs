use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use checkout_api::{app, middleware::HttpMetrics, AppState};
use checkout_order::testing::*;
use checkout_order::{AggregatorConfig, OrderAggregator, ResourceFetcher, WorkerPool};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Harness {
    client: Arc<ScriptedRemoteClient>,
    repo: Arc<RecordingOrderRepository>,
    state: AppState,
}

impl Harness {
    fn new(
        client: ScriptedRemoteClient,
        repo: RecordingOrderRepository,
        timeout: Duration,
    ) -> Self {
        let client = Arc::new(client);
        let repo = Arc::new(repo);
        let aggregator = OrderAggregator::new(
            ResourceFetcher::new(client.clone(), WorkerPool::new(8)),
            repo.clone(),
            AggregatorConfig::new(PAYMENT_URI, SHIPPING_URI, timeout),
        );
        let state = AppState {
            aggregator: Arc::new(aggregator),
            repository: repo.clone(),
            metrics: Arc::new(HttpMetrics::new("orders").unwrap()),
            service_name: "orders".to_string(),
        };
        Self { client, repo, state }
    }

    fn happy() -> Self {
        Self::new(
            ScriptedRemoteClient::happy_path(),
            RecordingOrderRepository::new(),
            Duration::from_secs(5),
        )
    }

    fn router(&self) -> Router {
        app(self.state.clone())
    }
}

fn order_request() -> Value {
    json!({
        "customer": CUSTOMER_REF,
        "address": ADDRESS_REF,
        "card": CARD_REF,
        "items": ITEMS_REF
    })
}

async fn post_order(router: Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_create_order_returns_created_order() {
    let harness = Harness::happy();

    let (status, body) = post_order(harness.router(), order_request()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total"], json!(22.99));
    assert_eq!(body["customerId"], "9");
    assert!(body["id"].is_string());
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(harness.repo.saved().len(), 1);
}

#[tokio::test]
async fn test_declined_payment_is_not_acceptable() {
    let client = ScriptedRemoteClient::happy_path();
    client.on_post(
        PAYMENT_URI,
        Reply::json(json!({"authorised": false, "message": "insufficient funds"})),
    );
    let harness = Harness::new(client, RecordingOrderRepository::new(), Duration::from_secs(5));

    let (status, body) = post_order(harness.router(), order_request()).await;

    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body["status"], 406);
    assert_eq!(body["message"], "insufficient funds");
    assert_eq!(harness.client.calls_to(Method::Post, SHIPPING_URI), 0);
    assert!(harness.repo.saved().is_empty());
}

#[tokio::test]
async fn test_incomplete_request_is_not_acceptable() {
    let harness = Harness::happy();

    let (status, body) = post_order(
        harness.router(),
        json!({"customer": CUSTOMER_REF, "address": ADDRESS_REF, "card": CARD_REF}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(
        body["message"],
        "Invalid order request. Order requires customer, address, card and items."
    );
    assert!(harness.client.calls().is_empty());
}

#[tokio::test]
async fn test_slow_dependency_is_internal_error() {
    let client = ScriptedRemoteClient::happy_path();
    client.on_get(ITEMS_REF, Reply::json(json!([])).after(Duration::from_secs(5)));
    let harness = Harness::new(client, RecordingOrderRepository::new(), Duration::from_millis(100));

    let (status, body) = post_order(harness.router(), order_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["message"],
        "Unable to create order due to timeout from one of the services."
    );
    assert_eq!(harness.client.calls_to(Method::Post, PAYMENT_URI), 0);
    assert!(harness.repo.saved().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_internal_error() {
    let client = ScriptedRemoteClient::happy_path();
    client.on_get(ADDRESS_REF, Reply::Status(503));
    let harness = Harness::new(client, RecordingOrderRepository::new(), Duration::from_secs(5));

    let (status, body) = post_order(harness.router(), order_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Unable to create order due to unspecified IO error.");
}

#[tokio::test]
async fn test_health_reports_store_status() {
    let harness = Harness::happy();
    let (status, body) = get(harness.router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["health"][0]["service"], "orders");
    assert_eq!(body["health"][0]["status"], "OK");
    assert_eq!(body["health"][1]["service"], "orders-db");
    assert_eq!(body["health"][1]["status"], "OK");

    let down = Harness::new(
        ScriptedRemoteClient::new(),
        RecordingOrderRepository::failing(),
        Duration::from_secs(5),
    );
    let (status, body) = get(down.router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["health"][1]["status"], "err");
}

#[tokio::test]
async fn test_metrics_record_matched_route() {
    let harness = Harness::happy();

    let (status, _) = post_order(harness.router(), order_request()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, text) = get(harness.router(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("http_request_duration_seconds"));
    assert!(text.contains("path=\"/orders\""));
    assert!(text.contains("status_code=\"201\""));
}
