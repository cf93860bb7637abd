//! Event schema definitions for the TrustFlow platform
//!
//! This module defines the outbound webhook event payloads. The synthetic
//! test event is built from the same structs and serializer as a real
//! delivery, so a passing test is evidence the production payload shape will
//! be accepted too.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Event Names
// =============================================================================

/// Emitted when a respondent submits a new testimonial to a space.
pub const EVENT_TESTIMONIAL_CREATED: &str = "testimonial.created";

/// Sample testimonial body used for the synthetic test event.
pub const SAMPLE_TESTIMONIAL_CONTENT: &str =
    "This is a test testimonial to verify your webhook integration is working correctly.";

// =============================================================================
// Payload Types
// =============================================================================

/// Envelope POSTed to webhook endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventPayload {
    pub event: String,
    pub timestamp: DateTime<Utc>,
    pub test: bool,
    pub data: TestimonialEvent,
}

/// Testimonial fields carried in a `testimonial.created` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestimonialEvent {
    pub id: String,
    pub space_id: String,
    pub respondent_name: String,
    pub respondent_email: String,
    pub content: String,
    pub rating: u8,
    #[serde(rename = "type")]
    pub testimonial_type: TestimonialType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestimonialType {
    Text,
    Video,
}

impl Default for TestimonialType {
    fn default() -> Self {
        TestimonialType::Text
    }
}

impl WebhookEventPayload {
    /// Envelope for a real `testimonial.created` delivery.
    pub fn testimonial_created(data: TestimonialEvent) -> Self {
        Self {
            event: EVENT_TESTIMONIAL_CREATED.to_string(),
            timestamp: Utc::now(),
            test: false,
            data,
        }
    }

    /// Envelope for a synthetic test delivery, flagged with `test: true` and
    /// carrying placeholder testimonial data with a fresh correlation id.
    pub fn test_event(space_id: &str) -> Self {
        Self {
            event: EVENT_TESTIMONIAL_CREATED.to_string(),
            timestamp: Utc::now(),
            test: true,
            data: TestimonialEvent::sample(space_id),
        }
    }
}

impl TestimonialEvent {
    /// Placeholder testimonial used by the test dispatcher. The id embeds the
    /// current epoch milliseconds so consecutive tests are distinguishable on
    /// the receiving side.
    pub fn sample(space_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: format!("test-{}", now.timestamp_millis()),
            space_id: space_id.to_string(),
            respondent_name: "Test User".to_string(),
            respondent_email: "test@example.com".to_string(),
            content: SAMPLE_TESTIMONIAL_CONTENT.to_string(),
            rating: 5,
            testimonial_type: TestimonialType::Text,
            created_at: now,
        }
    }
}
