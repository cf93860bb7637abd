//! Error handling module for the TrustFlow Webhook Service
//!
//! Errors are discriminated by variant, never by message content: the caller
//! can tell a URL-policy rejection from a quota rejection from a storage
//! failure without inspecting strings. Transport failures during a test
//! dispatch are deliberately NOT represented here; they are normalized into a
//! `WebhookTestResult` so the caller always has a renderable outcome.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for webhook service operations
pub type Result<T> = std::result::Result<T, WebhookError>;

/// Error types for the webhook service
#[derive(Error, Debug)]
pub enum WebhookError {
    /// URL security policy or request field rejections. `message` is the
    /// exact first-failing-rule text and must be surfaced verbatim.
    #[error("{message}")]
    Validation { message: String },

    /// The owning space has reached its endpoint quota
    #[error("Webhook endpoint limit reached: {limit} per space")]
    QuotaExceeded { limit: u32 },

    /// Endpoint lookup failures
    #[error("Webhook endpoint {id} not found")]
    EndpointNotFound { id: Uuid },

    /// Operations that require an active endpoint
    #[error("Webhook endpoint {id} is inactive")]
    EndpointInactive { id: Uuid },

    /// No live test result is cached for the endpoint
    #[error("No test result for endpoint {id}")]
    ResultNotFound { id: Uuid },

    /// Storage layer failures
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Internal server errors
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl WebhookError {
    /// Create a new validation error carrying the exact rule message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new quota error
    pub fn quota_exceeded(limit: u32) -> Self {
        Self::QuotaExceeded { limit }
    }

    /// Create a new not-found error
    pub fn endpoint_not_found(id: Uuid) -> Self {
        Self::EndpointNotFound { id }
    }

    /// Create a new inactive-endpoint error
    pub fn endpoint_inactive(id: Uuid) -> Self {
        Self::EndpointInactive { id }
    }

    /// Create a new missing-result error
    pub fn result_not_found(id: Uuid) -> Self {
        Self::ResultNotFound { id }
    }

    /// Create a new persistence error
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Validation { .. } => StatusCode::BAD_REQUEST,
            WebhookError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            WebhookError::EndpointNotFound { .. } | WebhookError::ResultNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            WebhookError::EndpointInactive { .. } => StatusCode::CONFLICT,
            WebhookError::Configuration { .. } => StatusCode::BAD_REQUEST,
            WebhookError::Persistence { .. }
            | WebhookError::Serialization { .. }
            | WebhookError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error (for API responses)
    pub fn error_code(&self) -> &'static str {
        match self {
            WebhookError::Validation { .. } => "VALIDATION_ERROR",
            WebhookError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            WebhookError::EndpointNotFound { .. } => "NOT_FOUND",
            WebhookError::EndpointInactive { .. } => "ENDPOINT_INACTIVE",
            WebhookError::ResultNotFound { .. } => "RESULT_NOT_FOUND",
            WebhookError::Persistence { .. } => "PERSISTENCE_ERROR",
            WebhookError::Configuration { .. } => "CONFIGURATION_ERROR",
            WebhookError::Serialization { .. } => "SERIALIZATION_ERROR",
            WebhookError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Persistence { .. })
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_code = self.error_code();
        let error_message = self.to_string();

        tracing::error!(
            error_code = error_code,
            error_message = %error_message,
            "Webhook service error"
        );

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": error_message,
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "retryable": self.is_retryable()
            }
        }));

        (status_code, body).into_response()
    }
}
