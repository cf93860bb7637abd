//! # Webhook URL Validator
//!
//! The webhook validator decides whether a user-supplied string is an
//! acceptable webhook destination, eliminating classes of SSRF targets before
//! the value is ever persisted or dispatched to. It also generates the
//! per-endpoint signing secret.
//!
//! Checks run in a fixed order and the first failing check wins; callers must
//! surface that exact message. All checks are string-level: the hostname is
//! never resolved, so a public-looking domain that resolves to a private
//! address at connect time is not caught here (see the service design notes).

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

/// Maximum accepted URL length, in characters
pub const MAX_URL_LENGTH: usize = 2048;

/// Length of a generated endpoint secret, in raw bytes (rendered as hex)
pub const SECRET_KEY_BYTES: usize = 32;

/// Hostname fragments that mark a loopback/unspecified destination
const LOCALHOST_MARKERS: [&str; 5] = ["localhost", "127.0.0.1", "0.0.0.0", "::1", "[::1]"];

/// Outcome of a URL policy check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub sanitized_url: Option<String>,
}

impl UrlValidation {
    fn accepted(sanitized_url: String) -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            sanitized_url: Some(sanitized_url),
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            is_valid: false,
            errors: vec![message.to_string()],
            sanitized_url: None,
        }
    }
}

/// Validation statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    /// Total URL validations performed
    pub total_checked: u64,
    /// URLs that passed the policy
    pub accepted: u64,
    /// URLs rejected by the policy
    pub rejected: u64,
    /// Rejections keyed by the rule that fired
    pub rejections_by_rule: HashMap<String, u64>,
    /// Last validation timestamp
    pub last_validated_at: Option<DateTime<Utc>>,
}

/// Main webhook URL validator
pub struct WebhookValidator {
    stats: Arc<RwLock<ValidationStats>>,
}

impl Default for WebhookValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookValidator {
    /// Create a new webhook validator
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ValidationStats::default())),
        }
    }

    /// Validate a candidate webhook URL against the security policy.
    ///
    /// Pure over its input: the same candidate always yields the same
    /// outcome. On success `sanitized_url` holds the trimmed (but otherwise
    /// unmodified) URL.
    pub fn validate_url(&self, candidate: &str) -> UrlValidation {
        match Self::apply_policy(candidate) {
            Ok(sanitized) => {
                self.record_outcome(None);
                UrlValidation::accepted(sanitized)
            }
            Err((rule, message)) => {
                self.record_outcome(Some(rule));
                UrlValidation::rejected(message)
            }
        }
    }

    /// Snapshot of the validation statistics
    pub fn stats(&self) -> ValidationStats {
        self.stats.read().clone()
    }

    /// The ordered policy checks. Returns the trimmed URL, or the first
    /// failing rule's name and message.
    fn apply_policy(candidate: &str) -> Result<String, (&'static str, &'static str)> {
        if candidate.is_empty() {
            return Err(("required", "URL is required"));
        }

        let trimmed = candidate.trim();
        if !trimmed.starts_with("https://") {
            return Err(("https_prefix", "Only secure HTTPS URLs are allowed"));
        }

        let parsed = match Url::parse(trimmed) {
            Ok(parsed) => parsed,
            Err(_) => return Err(("url_format", "Invalid URL format")),
        };

        let hostname = parsed.host_str().unwrap_or("").to_lowercase();
        if LOCALHOST_MARKERS
            .iter()
            .any(|marker| hostname.contains(marker))
        {
            return Err((
                "localhost",
                "Localhost URLs are not allowed for security reasons",
            ));
        }

        if let Ok(addr) = Ipv4Addr::from_str(&hostname) {
            if is_private_ipv4(addr) {
                return Err((
                    "private_ip",
                    "Private/internal IP addresses are not allowed",
                ));
            }
        }

        // Re-checked on the parsed URL, not the raw prefix
        if parsed.scheme() != "https" {
            return Err(("scheme", "Only HTTPS protocol is supported"));
        }

        if !hostname.contains('.') || hostname.ends_with('.') {
            return Err(("domain", "Please enter a valid domain"));
        }

        if trimmed.chars().count() > MAX_URL_LENGTH {
            return Err(("length", "URL is too long (max 2048 characters)"));
        }

        Ok(trimmed.to_string())
    }

    fn record_outcome(&self, rejected_rule: Option<&str>) {
        let mut stats = self.stats.write();
        stats.total_checked += 1;
        match rejected_rule {
            None => stats.accepted += 1,
            Some(rule) => {
                stats.rejected += 1;
                *stats
                    .rejections_by_rule
                    .entry(rule.to_string())
                    .or_insert(0) += 1;
            }
        }
        stats.last_validated_at = Some(Utc::now());
    }
}

/// Private, link-local, and shared address space ranges rejected by the
/// policy: 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16, 169.254.0.0/16,
/// 100.64.0.0/10.
fn is_private_ipv4(addr: Ipv4Addr) -> bool {
    let octets = addr.octets();
    match octets[0] {
        10 => true,
        172 => (16..=31).contains(&octets[1]),
        192 => octets[1] == 168,
        169 => octets[1] == 254,
        100 => (64..=127).contains(&octets[1]),
        _ => false,
    }
}

/// Generate a fresh endpoint secret: 32 bytes from a CSPRNG rendered as a
/// 64-character lowercase hex string.
///
/// The secret lets the receiving endpoint authenticate payload origin (via
/// the HMAC signature header), so a predictable generator would break that
/// guarantee.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
