//! API request and response type definitions for the TrustFlow platform
//!
//! This module contains the HTTP API models used for communication between
//! the dashboard frontend and the webhook service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::core::*;

// =============================================================================
// Webhook Lifecycle API Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWebhookRequest {
    pub url: String,
    pub description: Option<String>,
    pub event_types: Option<Vec<String>>,
}

/// Creation response. The only surface that ever discloses `secret_key`;
/// every later read goes through [`WebhookEndpointSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEndpointCreated {
    pub id: Uuid,
    pub space_id: String,
    pub url: String,
    pub description: Option<String>,
    pub secret_key: String,
    pub is_active: bool,
    pub event_types: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Endpoint view with the secret redacted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEndpointSummary {
    pub id: Uuid,
    pub space_id: String,
    pub url: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub event_types: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<WebhookEndpoint> for WebhookEndpointCreated {
    fn from(endpoint: WebhookEndpoint) -> Self {
        Self {
            id: endpoint.id,
            space_id: endpoint.space_id,
            url: endpoint.url,
            description: endpoint.description,
            secret_key: endpoint.secret_key,
            is_active: endpoint.is_active,
            event_types: endpoint.event_types,
            created_at: endpoint.created_at,
        }
    }
}

impl From<WebhookEndpoint> for WebhookEndpointSummary {
    fn from(endpoint: WebhookEndpoint) -> Self {
        Self {
            id: endpoint.id,
            space_id: endpoint.space_id,
            url: endpoint.url,
            description: endpoint.description,
            is_active: endpoint.is_active,
            event_types: endpoint.event_types,
            created_at: endpoint.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWebhooksResponse {
    pub webhooks: Vec<WebhookEndpointSummary>,
    pub total_count: u64,
}

// =============================================================================
// Webhook Test API Types
// =============================================================================

/// Relay request: the server performs the third-party POST on the caller's
/// behalf so the outcome is observable regardless of the receiver's CORS
/// policy. When `payload` is omitted the canonical synthetic test event is
/// sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookTestRequest {
    pub webhook_url: String,
    pub payload: Option<serde_json::Value>,
}

/// Relay response body. Dispatch failures are carried in `success` /
/// `error` / `error_type`, never as transport-level HTTP errors.
pub type WebhookTestResponse = WebhookTestResult;

/// Response for a test run against a registered endpoint: the raw outcome
/// plus its human-readable interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointTestResponse {
    pub result: WebhookTestResult,
    pub diagnosis: Diagnosis,
}
