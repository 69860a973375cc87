//! In-process registry store shared by the gateway and the demo services.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::registry::reference::{ClientHandle, HandleTracker, HttpClient};
use crate::registry::{
    EndpointRecord, RecordFilter, Registration, RegistrationId, RegistryError, ServiceRegistry,
};

/// A thread-safe registry held in memory.
///
/// Publications are keyed by [`RegistrationId`]; snapshots are returned in
/// publication order, which makes the first published record win when two
/// backends claim the same routing key.
#[derive(Debug)]
pub struct InMemoryRegistry {
    records: DashMap<RegistrationId, EndpointRecord>,
    next_id: AtomicU64,
    client: HttpClient,
    handles: HandleTracker,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
            client,
            handles: HandleTracker::new(),
        }
    }

    /// Number of published records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Handles acquired but not yet released.
    pub fn outstanding_handles(&self) -> usize {
        self.handles.outstanding()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceRegistry for InMemoryRegistry {
    async fn publish(&self, record: EndpointRecord) -> Result<Registration, RegistryError> {
        if record.name.trim().is_empty() {
            return Err(RegistryError::InvalidRecord {
                name: record.name,
                reason: "record name is empty".to_string(),
            });
        }

        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.records.insert(id, record.clone());

        tracing::info!(
            registration = %id,
            name = %record.name,
            record_type = %record.record_type,
            location = %record.location.authority(),
            api_name = record.routing_key().unwrap_or("-"),
            "Record published"
        );

        Ok(Registration { id, record })
    }

    async fn query_all(&self, filter: &RecordFilter) -> Result<Vec<EndpointRecord>, RegistryError> {
        let mut matching: Vec<(RegistrationId, EndpointRecord)> = self
            .records
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        matching.sort_by_key(|(id, _)| *id);

        Ok(matching.into_iter().map(|(_, record)| record).collect())
    }

    fn acquire_client(&self, record: &EndpointRecord) -> Result<ClientHandle, RegistryError> {
        let handle = ClientHandle::new(record, self.client.clone(), self.handles.lease())?;
        tracing::trace!(
            record = %record.name,
            outstanding = self.handles.outstanding(),
            "Client handle acquired"
        );
        Ok(handle)
    }
}
