//! Request handlers for the webhook service
//!
//! This module contains all HTTP request handlers for the webhook service API:
//! - Endpoint lifecycle handlers (register, list, toggle, delete)
//! - Test dispatch handlers (endpoint tests and the raw URL relay)
//! - Cached test result handlers
//! - Health and metrics handlers

use crate::error::Result;
use crate::manager::WebhookManager;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};
use trustflow_shared::{CreateWebhookRequest, WebhookTestRequest};
use uuid::Uuid;

pub mod endpoint_handler {
    use super::*;

    /// Register a new webhook endpoint in a space
    pub async fn create_webhook(
        State(manager): State<Arc<WebhookManager>>,
        Path(space_id): Path<String>,
        Json(request): Json<CreateWebhookRequest>,
    ) -> Result<impl IntoResponse> {
        info!("Creating webhook endpoint in space: {}", space_id);

        match manager.create_endpoint(&space_id, request).await {
            Ok(created) => {
                info!("Webhook endpoint created successfully: {}", created.id);
                Ok((StatusCode::CREATED, Json(created)))
            }
            Err(e) => {
                error!("Failed to create webhook endpoint: {}", e);
                Err(e)
            }
        }
    }

    /// List the webhook endpoints of a space, secrets redacted
    pub async fn list_webhooks(
        State(manager): State<Arc<WebhookManager>>,
        Path(space_id): Path<String>,
    ) -> Result<impl IntoResponse> {
        match manager.list_endpoints(&space_id).await {
            Ok(listed) => {
                info!(
                    "Retrieved {} webhook endpoints for space: {}",
                    listed.total_count, space_id
                );
                Ok(Json(listed))
            }
            Err(e) => {
                error!("Failed to list webhook endpoints: {}", e);
                Err(e)
            }
        }
    }

    /// Flip an endpoint's active flag
    pub async fn toggle_webhook(
        State(manager): State<Arc<WebhookManager>>,
        Path(id): Path<Uuid>,
    ) -> Result<impl IntoResponse> {
        info!("Toggling webhook endpoint: {}", id);

        match manager.toggle_endpoint(id).await {
            Ok(summary) => Ok(Json(summary)),
            Err(e) => {
                error!("Failed to toggle webhook endpoint {}: {}", id, e);
                Err(e)
            }
        }
    }

    /// Delete an endpoint and any cached test result for it
    pub async fn delete_webhook(
        State(manager): State<Arc<WebhookManager>>,
        Path(id): Path<Uuid>,
    ) -> Result<impl IntoResponse> {
        info!("Deleting webhook endpoint: {}", id);

        match manager.delete_endpoint(id).await {
            Ok(()) => {
                info!("Webhook endpoint deleted successfully: {}", id);
                Ok(StatusCode::NO_CONTENT)
            }
            Err(e) => {
                error!("Failed to delete webhook endpoint {}: {}", id, e);
                Err(e)
            }
        }
    }
}

pub mod test_handler {
    use super::*;

    /// Relay a test delivery to a caller-supplied URL.
    ///
    /// A webhook that answered with a failure status is still a completed
    /// relay: the outcome comes back as 200 with `success: false`, and only
    /// policy rejections or internal faults surface as error responses.
    pub async fn relay_test(
        State(manager): State<Arc<WebhookManager>>,
        Json(request): Json<WebhookTestRequest>,
    ) -> Result<impl IntoResponse> {
        info!("Relaying webhook test to: {}", request.webhook_url);

        match manager.relay_test(request).await {
            Ok(result) => {
                info!(
                    "Webhook test relay completed: success={} status={:?}",
                    result.success, result.status_code
                );
                Ok(Json(result))
            }
            Err(e) => {
                error!("Webhook test relay rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Send a synthetic test event to a registered endpoint
    pub async fn test_webhook(
        State(manager): State<Arc<WebhookManager>>,
        Path(id): Path<Uuid>,
    ) -> Result<impl IntoResponse> {
        info!("Testing webhook endpoint: {}", id);

        match manager.test_endpoint(id).await {
            Ok(response) => {
                info!(
                    "Webhook endpoint test completed: {} ({})",
                    id, response.diagnosis.title
                );
                Ok(Json(response))
            }
            Err(e) => {
                error!("Failed to test webhook endpoint {}: {}", id, e);
                Err(e)
            }
        }
    }

    /// Fetch the most recent unexpired test result for an endpoint
    pub async fn get_test_result(
        State(manager): State<Arc<WebhookManager>>,
        Path(id): Path<Uuid>,
    ) -> Result<impl IntoResponse> {
        match manager.test_result(id) {
            Ok(result) => Ok(Json(result)),
            Err(e) => Err(e),
        }
    }

    /// Dismiss an endpoint's cached test result
    pub async fn dismiss_test_result(
        State(manager): State<Arc<WebhookManager>>,
        Path(id): Path<Uuid>,
    ) -> Result<impl IntoResponse> {
        manager.dismiss_test_result(id);
        Ok(StatusCode::NO_CONTENT)
    }
}

/// Health check handler
pub async fn health_handler(
    State(manager): State<Arc<WebhookManager>>,
) -> Result<impl IntoResponse> {
    Ok(Json(manager.health()))
}

/// Validation statistics handler
pub async fn stats_handler(
    State(manager): State<Arc<WebhookManager>>,
) -> Result<impl IntoResponse> {
    Ok(Json(manager.validation_stats()))
}

/// Prometheus metrics handler
pub async fn metrics_handler(State(manager): State<Arc<WebhookManager>>) -> Result<Response> {
    if !manager.metrics_enabled() {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let body = manager.export_metrics()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
