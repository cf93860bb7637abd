//! Configuration module for the webhook service
//!
//! This module provides configuration structures and defaults for the HTTP
//! server, test dispatch, endpoint quotas, the result cache, and metrics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for the webhook service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookServiceConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Test dispatch configuration
    pub dispatch: DispatchConfig,

    /// Endpoint quota configuration
    pub limits: LimitsConfig,

    /// Test result cache configuration
    pub results: ResultsConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_connections: usize,
    pub timeout_seconds: u64,
    pub keep_alive_seconds: u64,
}

/// Test dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Deadline for a single test delivery; exceeding it classifies the
    /// outcome as a timeout
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub user_agent: String,
    pub verify_ssl: bool,
    /// Response bodies are truncated to this many bytes before being stored
    /// on the test result
    pub max_response_body_bytes: usize,
}

/// Endpoint quota configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum endpoints (active + inactive) per owning space
    pub max_endpoints_per_space: u32,
}

/// Test result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// How long an undismissed result stays retrievable after completion
    pub ttl_seconds: u64,
    /// Cadence of the background sweep that drops expired results
    pub sweep_interval_seconds: u64,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub namespace: String,
}

impl Default for WebhookServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            dispatch: DispatchConfig::default(),
            limits: LimitsConfig::default(),
            results: ResultsConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8094,
            max_connections: 1000,
            timeout_seconds: 30,
            keep_alive_seconds: 75,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 5,
            connect_timeout_seconds: 5,
            user_agent: "TrustFlow-Webhooks/1.0".to_string(),
            verify_ssl: true,
            max_response_body_bytes: 16 * 1024, // 16KB
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_endpoints_per_space: std::env::var("WEBHOOK_MAX_ENDPOINTS_PER_SPACE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        }
    }
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 60,
            sweep_interval_seconds: 10,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
            namespace: "webhook_service".to_string(),
        }
    }
}

impl WebhookServiceConfig {
    /// Load configuration from environment variables and config file
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let mut cfg = config::Config::builder();

        // Start with default configuration
        cfg = cfg.add_source(config::Config::try_from(&WebhookServiceConfig::default())?);

        // Add environment variables with prefix
        cfg = cfg.add_source(
            config::Environment::with_prefix("WEBHOOK")
                .separator("__")
                .try_parsing(true),
        );

        // Add config file if it exists
        if let Ok(config_file) = std::env::var("WEBHOOK_CONFIG_FILE") {
            cfg = cfg.add_source(config::File::with_name(&config_file).required(false));
        }

        cfg.build()?.try_deserialize()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if self.dispatch.timeout_seconds == 0 {
            return Err("Dispatch timeout must be greater than 0".to_string());
        }

        if self.dispatch.max_response_body_bytes == 0 {
            return Err("Response body cap must be greater than 0".to_string());
        }

        if self.limits.max_endpoints_per_space == 0 {
            return Err("Endpoint quota must be greater than 0".to_string());
        }

        if self.results.ttl_seconds == 0 {
            return Err("Result TTL must be greater than 0".to_string());
        }

        if self.results.sweep_interval_seconds == 0 {
            return Err("Result sweep interval must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Deadline for a single test dispatch
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch.timeout_seconds)
    }

    /// Lifetime of an undismissed test result
    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.results.ttl_seconds)
    }
}
