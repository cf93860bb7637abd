//! # Test Result Cache
//!
//! In-memory holder for webhook test results, keyed by endpoint id. Results
//! are ephemeral: a newer test of the same endpoint overwrites the previous
//! result (last-write-wins, with no cancellation of a superseded
//! in-flight test), the caller can dismiss a result explicitly, and anything
//! left undismissed expires a fixed interval after completion. Reads check
//! expiry themselves, so the background sweep cadence is unobservable.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use trustflow_shared::WebhookTestResult;
use uuid::Uuid;

struct CachedResult {
    result: WebhookTestResult,
    expires_at: Instant,
}

/// Keyed cache of the most recent test result per endpoint
pub struct TestResultCache {
    ttl: Duration,
    entries: DashMap<Uuid, CachedResult>,
}

impl TestResultCache {
    /// Create a cache whose entries live `ttl` after insertion
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Store the result for an endpoint, replacing any previous one and
    /// restarting its lifetime.
    pub fn insert(&self, endpoint_id: Uuid, result: WebhookTestResult) {
        self.entries.insert(
            endpoint_id,
            CachedResult {
                result,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Most recent unexpired result for an endpoint. Expired entries are
    /// dropped on sight.
    pub fn get(&self, endpoint_id: Uuid) -> Option<WebhookTestResult> {
        let now = Instant::now();
        {
            let entry = self.entries.get(&endpoint_id)?;
            if entry.expires_at > now {
                return Some(entry.result.clone());
            }
        }
        self.entries
            .remove_if(&endpoint_id, |_, cached| cached.expires_at <= now);
        None
    }

    /// Explicitly discard an endpoint's result; returns whether one existed
    /// (expired entries count as absent).
    pub fn dismiss(&self, endpoint_id: Uuid) -> bool {
        let now = Instant::now();
        self.entries
            .remove_if(&endpoint_id, |_, _| true)
            .map(|(_, cached)| cached.expires_at > now)
            .unwrap_or(false)
    }

    /// Drop every expired entry; returns how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, cached| cached.expires_at > now);
        before - self.entries.len()
    }

    /// Number of live (possibly expired, not yet swept) entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
