//! Shared type definitions for the TrustFlow platform
//!
//! This module provides the type definitions used across the platform's
//! services, ensuring consistency and type safety between them.

pub mod api;
pub mod core;
pub mod events;

// Re-export core types
pub use self::core::{
    Diagnosis, HealthStatus, Platform, ServiceHealth, Severity, TestErrorType, WebhookEndpoint,
    WebhookTestResult,
};

// Re-export API types
pub use api::{
    CreateWebhookRequest, EndpointTestResponse, ListWebhooksResponse, WebhookEndpointCreated,
    WebhookEndpointSummary, WebhookTestRequest, WebhookTestResponse,
};

// Re-export event types
pub use events::{
    TestimonialEvent, TestimonialType, WebhookEventPayload, EVENT_TESTIMONIAL_CREATED,
    SAMPLE_TESTIMONIAL_CONTENT,
};
