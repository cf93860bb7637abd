//! # Webhook Service
//!
//! Webhook endpoint management and test delivery for the TrustFlow platform:
//! - URL security screening for customer-supplied webhook destinations
//! - Endpoint lifecycle with per-space quotas and signing secrets
//! - One-shot test deliveries with latency measurement
//! - Outcome classification into actionable diagnoses
//! - Short-lived per-endpoint test result cache
//!
//! ## Features
//!
//! - **SSRF screening**: layered URL checks that reject localhost and
//!   private-network destinations before any server-side request is made
//! - **Signed deliveries**: HMAC-SHA256 signatures over the exact request body
//! - **Test relay**: dashboard-facing endpoint that exercises a candidate URL
//!   and reports the outcome without persisting anything
//! - **Diagnosis engine**: every `(status, error)` combination maps to a
//!   titled, human-readable diagnosis with advice and severity
//! - **Ephemeral results**: test outcomes expire on their own after a minute
//!
//! ## Usage
//!
//! ```rust,no_run
//! use webhook_service::{WebhookService, WebhookServiceConfig};
//! use trustflow_shared::CreateWebhookRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WebhookServiceConfig::default();
//!     let service = WebhookService::new(config)?;
//!
//!     let request = CreateWebhookRequest {
//!         url: "https://hooks.slack.com/services/T000/B000/XXXX".to_string(),
//!         description: Some("Team channel".to_string()),
//!         event_types: None,
//!     };
//!
//!     let created = service.create_endpoint("space-1", request).await?;
//!     println!("Webhook registered: {}", created.id);
//!
//!     let outcome = service.test_endpoint(created.id).await?;
//!     println!("{}: {}", outcome.diagnosis.title, outcome.diagnosis.message);
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod manager;
pub mod metrics;
pub mod results;
pub mod routes;
pub mod store;
pub mod validator;

pub use classifier::classify;
pub use self::config::WebhookServiceConfig;
pub use error::{Result, WebhookError};
pub use manager::WebhookManager;
pub use validator::{generate_secret, WebhookValidator};

// Re-export shared types for convenience
pub use trustflow_shared::{
    CreateWebhookRequest, Diagnosis, EndpointTestResponse, ListWebhooksResponse, Platform,
    Severity, TestErrorType, TestimonialEvent, WebhookEndpoint, WebhookEndpointCreated,
    WebhookEndpointSummary, WebhookEventPayload, WebhookTestRequest, WebhookTestResponse,
    WebhookTestResult,
};

use uuid::Uuid;

/// Main webhook service struct that coordinates all webhook operations
#[derive(Clone)]
pub struct WebhookService {
    manager: Arc<WebhookManager>,
}

impl WebhookService {
    /// Create a new webhook service with the given configuration
    pub fn new(config: WebhookServiceConfig) -> Result<Self> {
        let manager = Arc::new(WebhookManager::new(config)?);

        Ok(Self { manager })
    }

    /// Register a webhook endpoint in a space
    pub async fn create_endpoint(
        &self,
        space_id: &str,
        request: CreateWebhookRequest,
    ) -> Result<WebhookEndpointCreated> {
        self.manager.create_endpoint(space_id, request).await
    }

    /// List the endpoints of a space
    pub async fn list_endpoints(&self, space_id: &str) -> Result<ListWebhooksResponse> {
        self.manager.list_endpoints(space_id).await
    }

    /// Flip an endpoint's active flag
    pub async fn toggle_endpoint(&self, id: Uuid) -> Result<WebhookEndpointSummary> {
        self.manager.toggle_endpoint(id).await
    }

    /// Delete an endpoint
    pub async fn delete_endpoint(&self, id: Uuid) -> Result<()> {
        self.manager.delete_endpoint(id).await
    }

    /// Send a synthetic test event to a registered endpoint
    pub async fn test_endpoint(&self, id: Uuid) -> Result<EndpointTestResponse> {
        self.manager.test_endpoint(id).await
    }

    /// Relay a test delivery to a candidate URL
    pub async fn relay_test(&self, request: WebhookTestRequest) -> Result<WebhookTestResponse> {
        self.manager.relay_test(request).await
    }

    /// Most recent unexpired test result for an endpoint
    pub fn test_result(&self, endpoint_id: Uuid) -> Result<WebhookTestResult> {
        self.manager.test_result(endpoint_id)
    }

    /// Dismiss an endpoint's cached test result
    pub fn dismiss_test_result(&self, endpoint_id: Uuid) {
        self.manager.dismiss_test_result(endpoint_id)
    }

    /// Get the webhook manager for advanced operations
    pub fn manager(&self) -> &Arc<WebhookManager> {
        &self.manager
    }
}
