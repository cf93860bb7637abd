//! # Endpoint Store
//!
//! Persistence seam for webhook endpoint records. The storage technology is
//! an external collaborator, so the service talks to it through the
//! `EndpointStore` trait; the in-memory implementation backs tests and
//! single-node deployments. Storage failures surface as the structured
//! `Persistence` error kind.

use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use trustflow_shared::WebhookEndpoint;
use uuid::Uuid;

/// Storage operations for webhook endpoint records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EndpointStore: Send + Sync {
    /// Persist a new endpoint record
    async fn insert(&self, endpoint: WebhookEndpoint) -> Result<()>;

    /// Fetch an endpoint by id
    async fn get(&self, id: Uuid) -> Result<Option<WebhookEndpoint>>;

    /// All endpoints belonging to a space, oldest first
    async fn list_by_space(&self, space_id: &str) -> Result<Vec<WebhookEndpoint>>;

    /// Number of endpoints (active and inactive) in a space
    async fn count_for_space(&self, space_id: &str) -> Result<u32>;

    /// Update the `is_active` flag, returning the updated record
    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Option<WebhookEndpoint>>;

    /// Remove an endpoint; returns whether a record existed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// In-memory endpoint store keyed by endpoint id
#[derive(Default)]
pub struct InMemoryEndpointStore {
    endpoints: DashMap<Uuid, WebhookEndpoint>,
}

impl InMemoryEndpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EndpointStore for InMemoryEndpointStore {
    async fn insert(&self, endpoint: WebhookEndpoint) -> Result<()> {
        self.endpoints.insert(endpoint.id, endpoint);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<WebhookEndpoint>> {
        Ok(self.endpoints.get(&id).map(|entry| entry.clone()))
    }

    async fn list_by_space(&self, space_id: &str) -> Result<Vec<WebhookEndpoint>> {
        let mut endpoints: Vec<WebhookEndpoint> = self
            .endpoints
            .iter()
            .filter(|entry| entry.space_id == space_id)
            .map(|entry| entry.clone())
            .collect();
        endpoints.sort_by_key(|endpoint| (endpoint.created_at, endpoint.id));
        Ok(endpoints)
    }

    async fn count_for_space(&self, space_id: &str) -> Result<u32> {
        let count = self
            .endpoints
            .iter()
            .filter(|entry| entry.space_id == space_id)
            .count();
        Ok(count as u32)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Option<WebhookEndpoint>> {
        match self.endpoints.get_mut(&id) {
            Some(mut entry) => {
                entry.is_active = is_active;
                Ok(Some(entry.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.endpoints.remove(&id).is_some())
    }
}
