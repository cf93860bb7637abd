//! Metrics collection module for the webhook service
//!
//! Tracks URL validations, endpoint lifecycle activity, and test dispatch
//! outcomes/latency, exported in Prometheus text format.

use crate::config::MetricsConfig;
use crate::error::{Result, WebhookError};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Registry, TextEncoder,
};
use std::sync::Arc;
use tracing::info;
use trustflow_shared::{TestErrorType, WebhookTestResult};

/// Metrics collector for the webhook service
#[derive(Clone)]
pub struct WebhookMetrics {
    config: MetricsConfig,
    registry: Arc<Registry>,

    // Counters
    urls_validated: IntCounterVec,
    endpoints_created: IntCounter,
    endpoints_deleted: IntCounter,
    tests_total: IntCounterVec,

    // Gauges
    cached_results: IntGauge,

    // Histograms
    test_latency: Histogram,
}

impl WebhookMetrics {
    /// Create a new metrics collector
    pub fn new(config: &MetricsConfig) -> Result<Self> {
        info!("Initializing webhook metrics");

        let registry = Registry::new();

        let urls_validated = IntCounterVec::new(
            prometheus::Opts::new("urls_validated_total", "URL policy checks performed")
                .namespace(config.namespace.as_str()),
            &["outcome"],
        )
        .map_err(|e| {
            WebhookError::internal(format!("Failed to create urls_validated counter: {}", e))
        })?;

        let endpoints_created = IntCounter::with_opts(
            prometheus::Opts::new("endpoints_created_total", "Webhook endpoints created")
                .namespace(config.namespace.as_str()),
        )
        .map_err(|e| {
            WebhookError::internal(format!("Failed to create endpoints_created counter: {}", e))
        })?;

        let endpoints_deleted = IntCounter::with_opts(
            prometheus::Opts::new("endpoints_deleted_total", "Webhook endpoints deleted")
                .namespace(config.namespace.as_str()),
        )
        .map_err(|e| {
            WebhookError::internal(format!("Failed to create endpoints_deleted counter: {}", e))
        })?;

        let tests_total = IntCounterVec::new(
            prometheus::Opts::new("tests_total", "Webhook test dispatches by outcome")
                .namespace(config.namespace.as_str()),
            &["outcome"],
        )
        .map_err(|e| {
            WebhookError::internal(format!("Failed to create tests_total counter: {}", e))
        })?;

        let cached_results = IntGauge::with_opts(
            prometheus::Opts::new("cached_results", "Test results currently cached")
                .namespace(config.namespace.as_str()),
        )
        .map_err(|e| {
            WebhookError::internal(format!("Failed to create cached_results gauge: {}", e))
        })?;

        let test_latency = Histogram::with_opts(
            HistogramOpts::new("test_latency_seconds", "Webhook test delivery latency")
                .namespace(config.namespace.as_str())
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )
        .map_err(|e| {
            WebhookError::internal(format!("Failed to create test_latency histogram: {}", e))
        })?;

        registry
            .register(Box::new(urls_validated.clone()))
            .and_then(|_| registry.register(Box::new(endpoints_created.clone())))
            .and_then(|_| registry.register(Box::new(endpoints_deleted.clone())))
            .and_then(|_| registry.register(Box::new(tests_total.clone())))
            .and_then(|_| registry.register(Box::new(cached_results.clone())))
            .and_then(|_| registry.register(Box::new(test_latency.clone())))
            .map_err(|e| WebhookError::internal(format!("Failed to register metrics: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            registry: Arc::new(registry),
            urls_validated,
            endpoints_created,
            endpoints_deleted,
            tests_total,
            cached_results,
            test_latency,
        })
    }

    /// Record a URL policy decision
    pub fn record_validation(&self, accepted: bool) {
        let outcome = if accepted { "accepted" } else { "rejected" };
        self.urls_validated.with_label_values(&[outcome]).inc();
    }

    /// Record a created endpoint
    pub fn record_endpoint_created(&self) {
        self.endpoints_created.inc();
    }

    /// Record a deleted endpoint
    pub fn record_endpoint_deleted(&self) {
        self.endpoints_deleted.inc();
    }

    /// Record a completed test dispatch
    pub fn record_test(&self, result: &WebhookTestResult) {
        self.tests_total
            .with_label_values(&[Self::outcome_label(result)])
            .inc();
        if let Some(latency_ms) = result.latency_ms {
            self.test_latency.observe(latency_ms as f64 / 1000.0);
        }
    }

    /// Track the current size of the result cache
    pub fn set_cached_results(&self, count: usize) {
        self.cached_results.set(count as i64);
    }

    /// Whether the metrics endpoint is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Export all metrics in Prometheus text format
    pub fn export(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| WebhookError::internal(format!("Failed to encode metrics: {}", e)))?;
        String::from_utf8(buffer)
            .map_err(|e| WebhookError::internal(format!("Metrics encoding was not UTF-8: {}", e)))
    }

    fn outcome_label(result: &WebhookTestResult) -> &'static str {
        match result.error_type {
            Some(TestErrorType::Timeout) => "timeout",
            Some(TestErrorType::Connection) => "connection",
            None if result.success => "success",
            None => "http_error",
        }
    }
}
