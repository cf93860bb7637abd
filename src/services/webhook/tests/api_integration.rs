//! Integration tests for the webhook service HTTP API
//!
//! These tests drive the full router with in-memory requests and verify the
//! wire-level behavior of the service: endpoint lifecycle, the test relay,
//! cached result retrieval, and the structured error envelope.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use trustflow_shared::WebhookEndpoint;
use webhook_service::config::WebhookServiceConfig;
use webhook_service::manager::WebhookManager;
use webhook_service::routes::create_router;
use webhook_service::store::{EndpointStore, InMemoryEndpointStore};
use webhook_service::validator::generate_secret;

/// Test configuration with a small quota and a short dispatch deadline
fn create_test_config() -> WebhookServiceConfig {
    let mut config = WebhookServiceConfig::default();
    config.limits.max_endpoints_per_space = 3;
    config.dispatch.timeout_seconds = 2;
    config.dispatch.connect_timeout_seconds = 2;
    config
}

/// Router plus a handle to the backing store so tests can seed endpoints
/// that point at a local mock server (the URL policy would reject those
/// through the API).
fn create_test_app() -> (Router, Arc<InMemoryEndpointStore>) {
    let store = Arc::new(InMemoryEndpointStore::new());
    let manager = Arc::new(
        WebhookManager::with_store(create_test_config(), store.clone())
            .expect("manager construction"),
    );
    (create_router(manager), store)
}

async fn seed_endpoint(store: &InMemoryEndpointStore, url: &str, is_active: bool) -> Uuid {
    let endpoint = WebhookEndpoint {
        id: Uuid::new_v4(),
        space_id: "space-1".to_string(),
        url: url.to_string(),
        description: None,
        secret_key: generate_secret(),
        is_active,
        event_types: WebhookEndpoint::default_event_types(),
        created_at: Utc::now(),
    };
    let id = endpoint.id;
    store.insert(endpoint).await.expect("seed endpoint");
    id
}

/// Send a request through the router and decode the JSON response body
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request build"),
        None => builder.body(Body::empty()).expect("request build"),
    };

    let response = app.clone().oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_endpoint_lifecycle_over_http() {
    let (app, _store) = create_test_app();

    // Nothing registered yet.
    let (status, body) = send(&app, "GET", "/api/v1/spaces/space-1/webhooks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 0);

    // Register an endpoint; the creation response discloses the secret.
    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/spaces/space-1/webhooks",
        Some(json!({
            "url": "https://example.com/hooks/trustflow",
            "description": "CI notifications"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["url"], "https://example.com/hooks/trustflow");
    assert_eq!(created["is_active"], true);
    assert_eq!(created["event_types"], json!(["testimonial.created"]));
    let secret = created["secret_key"].as_str().expect("secret disclosed");
    assert_eq!(secret.len(), 64);

    // Listing shows the endpoint but never the secret.
    let (status, listed) = send(&app, "GET", "/api/v1/spaces/space-1/webhooks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total_count"], 1);
    assert!(listed["webhooks"][0].get("secret_key").is_none());
    assert_eq!(listed["webhooks"][0]["url"], "https://example.com/hooks/trustflow");

    // Toggle off and back on.
    let id = created["id"].as_str().expect("endpoint id");
    let (status, toggled) =
        send(&app, "POST", &format!("/api/v1/webhooks/{}/toggle", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["is_active"], false);

    let (status, toggled) =
        send(&app, "POST", &format!("/api/v1/webhooks/{}/toggle", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["is_active"], true);

    // Delete, then confirm it is gone.
    let (status, _) = send(&app, "DELETE", &format!("/api/v1/webhooks/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, error) = send(&app, "DELETE", &format!("/api/v1/webhooks/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_rejections_carry_exact_rule_messages() {
    let (app, _store) = create_test_app();

    for (url, message) in [
        ("", "URL is required"),
        ("http://example.com/hook", "Only secure HTTPS URLs are allowed"),
        (
            "https://localhost:3000/hook",
            "Localhost URLs are not allowed for security reasons",
        ),
        (
            "https://192.168.1.10/hook",
            "Private/internal IP addresses are not allowed",
        ),
        ("https://internal", "Please enter a valid domain"),
    ] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/spaces/space-1/webhooks",
            Some(json!({ "url": url })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "for {:?}", url);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], message);
        assert_eq!(body["error"]["retryable"], false);
    }
}

#[tokio::test]
async fn test_quota_exhaustion_returns_429() {
    let (app, _store) = create_test_app();

    for i in 0..3 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/spaces/space-1/webhooks",
            Some(json!({ "url": format!("https://example.com/hooks/{}", i) })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/spaces/space-1/webhooks",
        Some(json!({ "url": "https://example.com/hooks/overflow" })),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "QUOTA_EXCEEDED");
    assert_eq!(
        body["error"]["message"],
        "Webhook endpoint limit reached: 3 per space"
    );

    // A different space still has room.
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/spaces/space-2/webhooks",
        Some(json!({ "url": "https://example.com/hooks/other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_endpoint_test_and_cached_result_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("received"))
        .mount(&server)
        .await;

    let (app, store) = create_test_app();
    let id = seed_endpoint(&store, &server.uri(), true).await;

    // Run the test; the response carries both raw outcome and diagnosis.
    let (status, body) = send(&app, "POST", &format!("/api/v1/webhooks/{}/test", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["success"], true);
    assert_eq!(body["result"]["status_code"], 200);
    assert!(body["result"]["latency_ms"].is_u64());
    assert_eq!(body["result"]["request_payload"]["event"], "testimonial.created");
    assert_eq!(body["result"]["request_payload"]["test"], true);
    assert_eq!(body["diagnosis"]["title"], "Connection Successful");
    assert_eq!(body["diagnosis"]["severity"], "success");

    // The result is retrievable until dismissed.
    let (status, cached) =
        send(&app, "GET", &format!("/api/v1/webhooks/{}/result", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached["status_code"], 200);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/webhooks/{}/result", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/v1/webhooks/{}/result", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESULT_NOT_FOUND");
}

#[tokio::test]
async fn test_failure_statuses_still_complete_with_diagnosis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (app, store) = create_test_app();
    let id = seed_endpoint(&store, &server.uri(), true).await;

    let (status, body) = send(&app, "POST", &format!("/api/v1/webhooks/{}/test", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["success"], false);
    assert_eq!(body["result"]["status_code"], 401);
    assert_eq!(body["diagnosis"]["title"], "Permission Denied");
    assert_eq!(body["diagnosis"]["severity"], "error");
}

#[tokio::test]
async fn test_inactive_endpoint_test_conflicts() {
    let (app, store) = create_test_app();
    let id = seed_endpoint(&store, "https://example.com/hooks", false).await;

    let (status, body) = send(&app, "POST", &format!("/api/v1/webhooks/{}/test", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ENDPOINT_INACTIVE");
}

#[tokio::test]
async fn test_concurrent_tests_leave_the_later_finisher_cached() {
    let server = MockServer::start().await;
    // The first arriving request is answered with a delayed 500, every
    // later one with an immediate 200.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(400)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (app, store) = create_test_app();
    let id = seed_endpoint(&store, &server.uri(), true).await;

    let slow = tokio::spawn({
        let app = app.clone();
        let uri = format!("/api/v1/webhooks/{}/test", id);
        async move { send(&app, "POST", &uri, None).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, fast) = send(&app, "POST", &format!("/api/v1/webhooks/{}/test", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fast["result"]["status_code"], 200);

    let (slow_status, slow_body) = slow.await.expect("slow test task");
    assert_eq!(slow_status, StatusCode::OK);
    assert_eq!(slow_body["result"]["status_code"], 500);

    // Whichever test finished last owns the cached result.
    let (status, cached) =
        send(&app, "GET", &format!("/api/v1/webhooks/{}/result", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached["status_code"], 500);
    assert_eq!(cached["success"], false);
}

#[tokio::test]
async fn test_relay_reports_policy_rejections() {
    let (app, _store) = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/webhooks/test",
        Some(json!({ "webhook_url": "https://169.254.1.1/hook" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["message"],
        "Private/internal IP addresses are not allowed"
    );
}

#[tokio::test]
async fn test_relay_rejects_missing_url_field() {
    let (app, _store) = create_test_app();

    let (status, _) = send(&app, "POST", "/api/webhooks/test", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_and_malformed_endpoint_ids() {
    let (app, _store) = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/webhooks/{}/test", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, "GET", "/api/v1/webhooks/not-a-uuid/result", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let (app, _store) = create_test_app();

    let (status, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["service"], "webhook-service");
    assert_eq!(health["status"], "healthy");
    assert!(health["version"].is_string());

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .expect("request build");
    let response = app.clone().oneshot(request).await.expect("router call");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("webhook_service"));
}

#[tokio::test]
async fn test_validation_stats_endpoint() {
    let (app, _store) = create_test_app();

    let _ = send(
        &app,
        "POST",
        "/api/v1/spaces/space-1/webhooks",
        Some(json!({ "url": "https://example.com/hooks" })),
    )
    .await;
    let _ = send(
        &app,
        "POST",
        "/api/v1/spaces/space-1/webhooks",
        Some(json!({ "url": "http://example.com/hooks" })),
    )
    .await;

    let (status, stats) = send(&app, "GET", "/api/v1/stats/validation", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_checked"], 2);
    assert_eq!(stats["accepted"], 1);
    assert_eq!(stats["rejected"], 1);
}
