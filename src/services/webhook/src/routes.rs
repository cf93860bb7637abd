//! Routes module for the webhook service
//!
//! This module defines all HTTP routes for the webhook service:
//! - The public test relay used by the dashboard
//! - Endpoint lifecycle operations
//! - Test dispatch and cached result operations
//! - Health and metrics endpoints

use crate::handlers::{
    endpoint_handler, health_handler, metrics_handler, stats_handler, test_handler,
};
use crate::manager::WebhookManager;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

/// Build the main router for the webhook service
pub fn create_router(manager: Arc<WebhookManager>) -> Router {
    let request_timeout = Duration::from_secs(manager.config().server.timeout_seconds);

    let relay_router = create_relay_router(Arc::clone(&manager));
    let api_router = create_api_router(Arc::clone(&manager));
    let health_router = create_health_router(manager);

    // Main router with middleware
    Router::new()
        .merge(relay_router)
        .merge(api_router)
        .merge(health_router)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .into_inner(),
        )
}

/// The relay route the dashboard calls to test arbitrary candidate URLs
fn create_relay_router(manager: Arc<WebhookManager>) -> Router {
    Router::new()
        .route("/api/webhooks/test", post(test_handler::relay_test))
        .with_state(manager)
}

/// Create API routes for REST endpoints
fn create_api_router(manager: Arc<WebhookManager>) -> Router {
    Router::new()
        // Endpoint lifecycle
        .route(
            "/api/v1/spaces/:space_id/webhooks",
            post(endpoint_handler::create_webhook),
        )
        .route(
            "/api/v1/spaces/:space_id/webhooks",
            get(endpoint_handler::list_webhooks),
        )
        .route(
            "/api/v1/webhooks/:id/toggle",
            post(endpoint_handler::toggle_webhook),
        )
        .route(
            "/api/v1/webhooks/:id",
            delete(endpoint_handler::delete_webhook),
        )
        // Test dispatch and cached results
        .route("/api/v1/webhooks/:id/test", post(test_handler::test_webhook))
        .route(
            "/api/v1/webhooks/:id/result",
            get(test_handler::get_test_result),
        )
        .route(
            "/api/v1/webhooks/:id/result",
            delete(test_handler::dismiss_test_result),
        )
        // Statistics
        .route("/api/v1/stats/validation", get(stats_handler))
        .with_state(manager)
}

/// Create health and metrics routes
fn create_health_router(manager: Arc<WebhookManager>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(manager)
}
