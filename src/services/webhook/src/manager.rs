//! Webhook Manager
//!
//! The core component that coordinates webhook operations:
//! - Endpoint lifecycle (create with URL policy + quota, toggle, delete)
//! - Test dispatch against registered endpoints and the raw test relay
//! - The ephemeral per-endpoint test result cache
//! - Metrics and validation statistics

use crate::classifier::classify;
use crate::config::WebhookServiceConfig;
use crate::dispatcher::TestDispatcher;
use crate::error::{Result, WebhookError};
use crate::metrics::WebhookMetrics;
use crate::results::TestResultCache;
use crate::store::{EndpointStore, InMemoryEndpointStore};
use crate::validator::{generate_secret, ValidationStats, WebhookValidator};

use trustflow_shared::{
    CreateWebhookRequest, EndpointTestResponse, HealthStatus, ListWebhooksResponse, ServiceHealth,
    WebhookEndpoint, WebhookEndpointCreated, WebhookEndpointSummary, WebhookEventPayload,
    WebhookTestRequest, WebhookTestResponse, WebhookTestResult,
};

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Maximum accepted endpoint description length, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Main webhook manager that coordinates all webhook operations
pub struct WebhookManager {
    config: WebhookServiceConfig,

    // Core components
    validator: WebhookValidator,
    dispatcher: TestDispatcher,
    store: Arc<dyn EndpointStore>,
    results: TestResultCache,
    metrics: WebhookMetrics,

    started_at: Instant,
}

impl WebhookManager {
    /// Create a new webhook manager with in-memory endpoint storage
    pub fn new(config: WebhookServiceConfig) -> Result<Self> {
        let store: Arc<dyn EndpointStore> = Arc::new(InMemoryEndpointStore::new());
        Self::with_store(config, store)
    }

    /// Create a new webhook manager on top of an existing endpoint store
    pub fn with_store(config: WebhookServiceConfig, store: Arc<dyn EndpointStore>) -> Result<Self> {
        info!("Initializing webhook manager");

        config.validate().map_err(WebhookError::configuration)?;

        let dispatcher = TestDispatcher::new(&config.dispatch)?;
        let metrics = WebhookMetrics::new(&config.metrics)?;
        let results = TestResultCache::new(config.result_ttl());

        info!("Webhook manager initialized successfully");

        Ok(Self {
            config,
            validator: WebhookValidator::new(),
            dispatcher,
            store,
            results,
            metrics,
            started_at: Instant::now(),
        })
    }

    /// Register a new webhook endpoint for a space.
    ///
    /// The URL must pass the security policy and the space must be under its
    /// endpoint quota; the generated secret is disclosed in this response and
    /// never again.
    pub async fn create_endpoint(
        &self,
        space_id: &str,
        request: CreateWebhookRequest,
    ) -> Result<WebhookEndpointCreated> {
        let validation = self.validator.validate_url(&request.url);
        self.metrics.record_validation(validation.is_valid);
        let sanitized_url = match validation.sanitized_url {
            Some(url) => url,
            None => {
                let message = validation
                    .errors
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| "Invalid URL format".to_string());
                return Err(WebhookError::validation(message));
            }
        };

        if let Some(description) = &request.description {
            if description.chars().count() > MAX_DESCRIPTION_LENGTH {
                return Err(WebhookError::validation(
                    "Description is too long (max 100 characters)",
                ));
            }
        }

        let limit = self.config.limits.max_endpoints_per_space;
        let existing = self.store.count_for_space(space_id).await?;
        if existing >= limit {
            return Err(WebhookError::quota_exceeded(limit));
        }

        let event_types = request
            .event_types
            .filter(|types| !types.is_empty())
            .unwrap_or_else(WebhookEndpoint::default_event_types);

        let endpoint = WebhookEndpoint {
            id: Uuid::new_v4(),
            space_id: space_id.to_string(),
            url: sanitized_url,
            description: request.description,
            secret_key: generate_secret(),
            is_active: true,
            event_types,
            created_at: Utc::now(),
        };

        self.store.insert(endpoint.clone()).await?;
        self.metrics.record_endpoint_created();

        info!(
            endpoint_id = %endpoint.id,
            space_id = %endpoint.space_id,
            url = %endpoint.url,
            "webhook endpoint created"
        );

        Ok(endpoint.into())
    }

    /// All endpoints in a space, secrets redacted
    pub async fn list_endpoints(&self, space_id: &str) -> Result<ListWebhooksResponse> {
        let endpoints = self.store.list_by_space(space_id).await?;
        let total_count = endpoints.len() as u64;
        let webhooks = endpoints
            .into_iter()
            .map(WebhookEndpointSummary::from)
            .collect();

        Ok(ListWebhooksResponse {
            webhooks,
            total_count,
        })
    }

    /// Flip an endpoint's `is_active` flag; no other field is touched
    pub async fn toggle_endpoint(&self, id: Uuid) -> Result<WebhookEndpointSummary> {
        let current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| WebhookError::endpoint_not_found(id))?;

        let updated = self
            .store
            .set_active(id, !current.is_active)
            .await?
            .ok_or_else(|| WebhookError::endpoint_not_found(id))?;

        info!(
            endpoint_id = %id,
            is_active = updated.is_active,
            "webhook endpoint toggled"
        );

        Ok(updated.into())
    }

    /// Irreversibly remove an endpoint and any cached test result for it
    pub async fn delete_endpoint(&self, id: Uuid) -> Result<()> {
        let deleted = self.store.delete(id).await?;
        if !deleted {
            return Err(WebhookError::endpoint_not_found(id));
        }

        self.results.dismiss(id);
        self.metrics.record_endpoint_deleted();
        self.metrics.set_cached_results(self.results.len());

        info!(endpoint_id = %id, "webhook endpoint deleted");
        Ok(())
    }

    /// Send a synthetic `testimonial.created` event to a registered endpoint
    /// and cache the outcome.
    ///
    /// Inactive endpoints are excluded from testing. The payload is built
    /// from the same schema as real deliveries and signed with the endpoint's
    /// secret. Transport failures come back as an unsuccessful result, not an
    /// error; a concurrent test of the same endpoint simply overwrites the
    /// cached result when it finishes later (last-write-wins).
    pub async fn test_endpoint(&self, id: Uuid) -> Result<EndpointTestResponse> {
        let endpoint = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| WebhookError::endpoint_not_found(id))?;

        if !endpoint.is_active {
            return Err(WebhookError::endpoint_inactive(id));
        }

        let payload = serde_json::to_value(WebhookEventPayload::test_event(&endpoint.space_id))?;
        let result = self
            .dispatcher
            .dispatch(&endpoint.url, &payload, Some(&endpoint.secret_key))
            .await?;

        self.metrics.record_test(&result);
        self.results.insert(id, result.clone());
        self.metrics.set_cached_results(self.results.len());

        let diagnosis = classify(result.status_code, result.error_type);
        debug!(
            endpoint_id = %id,
            success = result.success,
            diagnosis = %diagnosis.title,
            "webhook test completed"
        );

        Ok(EndpointTestResponse { result, diagnosis })
    }

    /// Relay a test delivery to a candidate URL on the caller's behalf.
    ///
    /// The URL is held to the same security policy as endpoint creation -
    /// the relay performs server-side POSTs and must not become an open
    /// proxy into internal networks. The outcome is returned but not cached
    /// (there is no endpoint to key it by).
    pub async fn relay_test(&self, request: WebhookTestRequest) -> Result<WebhookTestResponse> {
        let validation = self.validator.validate_url(&request.webhook_url);
        self.metrics.record_validation(validation.is_valid);
        let sanitized_url = match validation.sanitized_url {
            Some(url) => url,
            None => {
                let message = validation
                    .errors
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| "Invalid URL format".to_string());
                return Err(WebhookError::validation(message));
            }
        };

        let payload = match request.payload {
            Some(payload) => payload,
            None => serde_json::to_value(WebhookEventPayload::test_event("unknown"))?,
        };

        let result = self.dispatcher.dispatch(&sanitized_url, &payload, None).await?;
        self.metrics.record_test(&result);

        Ok(result)
    }

    /// Most recent unexpired test result for an endpoint
    pub fn test_result(&self, endpoint_id: Uuid) -> Result<WebhookTestResult> {
        self.results
            .get(endpoint_id)
            .ok_or_else(|| WebhookError::result_not_found(endpoint_id))
    }

    /// Dismiss an endpoint's cached test result. Idempotent.
    pub fn dismiss_test_result(&self, endpoint_id: Uuid) {
        self.results.dismiss(endpoint_id);
        self.metrics.set_cached_results(self.results.len());
    }

    /// Drop expired test results; called by the background sweeper
    pub fn cleanup_expired_results(&self) -> usize {
        let removed = self.results.sweep_expired();
        self.metrics.set_cached_results(self.results.len());
        if removed > 0 {
            debug!(removed = removed, "swept expired webhook test results");
        }
        removed
    }

    /// Service health report
    pub fn health(&self) -> ServiceHealth {
        ServiceHealth {
            service: "webhook-service".to_string(),
            status: HealthStatus::Healthy,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            timestamp: Utc::now(),
        }
    }

    /// Snapshot of URL validation statistics
    pub fn validation_stats(&self) -> ValidationStats {
        self.validator.stats()
    }

    /// Prometheus text export
    pub fn export_metrics(&self) -> Result<String> {
        self.metrics.export()
    }

    /// Whether the metrics endpoint is enabled
    pub fn metrics_enabled(&self) -> bool {
        self.metrics.is_enabled()
    }

    /// Service configuration
    pub fn config(&self) -> &WebhookServiceConfig {
        &self.config
    }
}
