//! Core type definitions for the TrustFlow platform
//!
//! This module contains the shared webhook domain types used across services,
//! ensuring consistency and type safety between the API surface and the
//! dispatch/testing pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// WEBHOOK ENDPOINT TYPES
// ============================================================================

/// A registered webhook destination belonging to a space.
///
/// The `url` has always passed the URL security policy before a record is
/// created; the record is immutable after creation except for `is_active`.
/// `secret_key` is generated exactly once and is only ever disclosed in the
/// creation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    pub id: Uuid,
    pub space_id: String,
    pub url: String,
    pub description: Option<String>,
    pub secret_key: String,
    pub is_active: bool,
    pub event_types: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl WebhookEndpoint {
    /// Default event subscription for newly created endpoints.
    pub fn default_event_types() -> Vec<String> {
        vec![crate::types::events::EVENT_TESTIMONIAL_CREATED.to_string()]
    }
}

/// Receiver platform inferred from the endpoint hostname.
///
/// Used only for display hints (payload formatting advice in the UI); the
/// dispatch path treats all platforms identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Slack,
    Discord,
    Generic,
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Generic
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Slack => write!(f, "slack"),
            Platform::Discord => write!(f, "discord"),
            Platform::Generic => write!(f, "generic"),
        }
    }
}

impl Platform {
    /// Infer the receiving platform from a webhook URL's hostname.
    pub fn from_url(url: &str) -> Self {
        let host = url
            .split("://")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .unwrap_or("")
            .to_lowercase();
        // Strip a port if present.
        let host = host.split(':').next().unwrap_or("");
        if host == "hooks.slack.com" || host.ends_with(".slack.com") {
            Platform::Slack
        } else if host == "discord.com"
            || host == "discordapp.com"
            || host.ends_with(".discord.com")
            || host.ends_with(".discordapp.com")
        {
            Platform::Discord
        } else {
            Platform::Generic
        }
    }
}

// ============================================================================
// WEBHOOK TEST RESULT TYPES
// ============================================================================

/// Transport-level failure classification for a test dispatch that never
/// produced an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestErrorType {
    Timeout,
    Connection,
}

impl fmt::Display for TestErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestErrorType::Timeout => write!(f, "timeout"),
            TestErrorType::Connection => write!(f, "connection"),
        }
    }
}

impl FromStr for TestErrorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timeout" => Ok(TestErrorType::Timeout),
            "connection" => Ok(TestErrorType::Connection),
            _ => Err(format!("Invalid test error type: {}", s)),
        }
    }
}

/// Outcome of a single webhook test dispatch.
///
/// Ephemeral: held in the in-memory result cache keyed by endpoint id,
/// overwritten by any newer test of the same endpoint, and expired a fixed
/// interval after completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookTestResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub latency_ms: Option<u64>,
    pub error_type: Option<TestErrorType>,
    pub platform: Platform,
    pub request_payload: serde_json::Value,
    pub response_body: Option<String>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// DIAGNOSIS TYPES
// ============================================================================

/// Severity band of a diagnosis, driving the UI colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Human-readable interpretation of a raw test outcome.
///
/// Produced by the outcome classifier from `(status_code, error_type)`;
/// every outcome maps to some diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub title: String,
    pub message: String,
    pub advice: String,
    pub severity: Severity,
}

// ============================================================================
// SERVICE HEALTH
// ============================================================================

/// Health report returned by the service health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service: String,
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_detection_from_url() {
        assert_eq!(
            Platform::from_url("https://hooks.slack.com/services/T0/B0/x"),
            Platform::Slack
        );
        assert_eq!(
            Platform::from_url("https://discord.com/api/webhooks/1/x"),
            Platform::Discord
        );
        assert_eq!(
            Platform::from_url("https://discordapp.com/api/webhooks/1/x"),
            Platform::Discord
        );
        assert_eq!(
            Platform::from_url("https://hooks.zapier.com/hooks/catch/123/abc"),
            Platform::Generic
        );
    }

    #[test]
    fn platform_detection_ignores_port_and_case() {
        assert_eq!(
            Platform::from_url("https://HOOKS.SLACK.COM:443/services/x"),
            Platform::Slack
        );
    }

    #[test]
    fn platform_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Platform::Slack).unwrap(), "\"slack\"");
        assert_eq!(
            serde_json::to_string(&Platform::Generic).unwrap(),
            "\"generic\""
        );
    }

    #[test]
    fn test_error_type_round_trips_as_lowercase() {
        assert_eq!(
            serde_json::to_string(&TestErrorType::Timeout).unwrap(),
            "\"timeout\""
        );
        assert_eq!(
            "connection".parse::<TestErrorType>().unwrap(),
            TestErrorType::Connection
        );
        assert!("refused".parse::<TestErrorType>().is_err());
    }

    #[test]
    fn default_event_types_contains_testimonial_created() {
        let defaults = WebhookEndpoint::default_event_types();
        assert_eq!(defaults, vec!["testimonial.created".to_string()]);
    }
}
