//! # Webhook Test Dispatcher
//!
//! Performs the actual third-party POST for a webhook test and normalizes
//! whatever happens on the wire into a `WebhookTestResult`. Transport
//! failures are an outcome here, not an error: the caller always gets a
//! result it can classify and render. Latency is measured around the send
//! itself.

use crate::config::DispatchConfig;
use crate::error::{Result, WebhookError};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{header, redirect, Client};
use sha2::Sha256;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use trustflow_shared::{Platform, TestErrorType, WebhookTestResult};

/// Header carrying `sha256=<hex hmac>` of the request body, keyed with the
/// endpoint's secret, so receivers can authenticate payload origin.
pub const SIGNATURE_HEADER: &str = "x-trustflow-signature";

/// Dispatcher for webhook test deliveries
#[derive(Clone)]
pub struct TestDispatcher {
    config: DispatchConfig,
    client: Client,
}

impl TestDispatcher {
    /// Create a new dispatcher with a shared HTTP client.
    ///
    /// Redirects are never followed: a policy-validated URL must not be able
    /// to bounce the POST to an unvalidated destination, so a 3xx answer is
    /// surfaced verbatim instead.
    pub fn new(config: &DispatchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| {
                WebhookError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// POST `payload` to `url` and normalize the outcome.
    ///
    /// Latency covers dispatch up to the response head (or the failure);
    /// `success` means a 2xx status. When `secret_key` is given the request
    /// carries the signature header. Only internal failures (signing) error;
    /// every network outcome returns `Ok`.
    pub async fn dispatch(
        &self,
        url: &str,
        payload: &serde_json::Value,
        secret_key: Option<&str>,
    ) -> Result<WebhookTestResult> {
        let platform = Platform::from_url(url);
        let body = payload.to_string();

        let mut request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .body(body.clone());

        if let Some(secret) = secret_key {
            let signature = sign_payload(secret, body.as_bytes())?;
            request = request.header(SIGNATURE_HEADER, format!("sha256={}", signature));
        }

        let t0 = Instant::now();
        let outcome = request.send().await;
        let latency_ms = t0.elapsed().as_millis() as u64;

        match outcome {
            Ok(response) => {
                let status = response.status();
                debug!(
                    url = %url,
                    status = status.as_u16(),
                    latency_ms = latency_ms,
                    "webhook test delivery completed"
                );

                let response_body = self.read_capped_body(response).await;

                Ok(WebhookTestResult {
                    success: status.is_success(),
                    status_code: Some(status.as_u16()),
                    latency_ms: Some(latency_ms),
                    error_type: None,
                    platform,
                    request_payload: payload.clone(),
                    response_body,
                    error: None,
                    timestamp: Utc::now(),
                })
            }
            Err(e) => {
                let error_type = if e.is_timeout() {
                    TestErrorType::Timeout
                } else {
                    TestErrorType::Connection
                };
                warn!(
                    url = %url,
                    error_type = %error_type,
                    latency_ms = latency_ms,
                    error = %e,
                    "webhook test delivery failed without a response"
                );

                Ok(WebhookTestResult {
                    success: false,
                    status_code: None,
                    latency_ms: Some(latency_ms),
                    error_type: Some(error_type),
                    platform,
                    request_payload: payload.clone(),
                    response_body: None,
                    error: Some(e.to_string()),
                    timestamp: Utc::now(),
                })
            }
        }
    }

    /// Read the response body, truncated to the configured cap so oversized
    /// responses cannot bloat the in-memory result cache.
    async fn read_capped_body(&self, response: reqwest::Response) -> Option<String> {
        match response.bytes().await {
            Ok(bytes) => {
                let cap = self.config.max_response_body_bytes.min(bytes.len());
                Some(String::from_utf8_lossy(&bytes[..cap]).into_owned())
            }
            Err(e) => {
                warn!(error = %e, "failed to read webhook test response body");
                None
            }
        }
    }
}

/// Hex HMAC-SHA256 of `body` keyed with the endpoint secret.
pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::internal("Invalid HMAC key"))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
