//! Service registry subsystem.
//!
//! # Data Flow
//! ```text
//! Backend startup:
//!     publish(EndpointRecord) → Registration (id ordered by publication)
//!
//! Per dispatch (gateway, read-only):
//!     query_all(filter)            → fresh snapshot, never cached
//!     acquire_client(&record)      → ClientHandle (counted)
//!     release(handle) / drop       → count decremented exactly once
//! ```

pub mod memory;
pub mod record;
pub mod reference;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::InMemoryRegistry;
pub use record::{
    EndpointRecord, Location, RecordMetadata, RecordType, Registration, RegistrationId, API_NAME_KEY,
};
pub use reference::{ClientHandle, HandleTracker, HttpClient, Lease};

/// Predicate applied to each record during a query.
pub type RecordFilter = dyn Fn(&EndpointRecord) -> bool + Send + Sync;

/// Errors raised by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry store could not be reached or answered with an error.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// A record cannot be published or bound to a client.
    #[error("invalid record '{name}': {reason}")]
    InvalidRecord { name: String, reason: String },
}

/// Directory of published endpoint records.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Publish a record. Used by backends; the gateway only publishes itself.
    async fn publish(&self, record: EndpointRecord) -> Result<Registration, RegistryError>;

    /// Fetch every record accepted by `filter`, in publication order.
    async fn query_all(&self, filter: &RecordFilter) -> Result<Vec<EndpointRecord>, RegistryError>;

    /// Acquire a client bound to `record`'s location.
    fn acquire_client(&self, record: &EndpointRecord) -> Result<ClientHandle, RegistryError>;

    /// Release a handle obtained from [`ServiceRegistry::acquire_client`].
    fn release(&self, handle: ClientHandle) {
        tracing::trace!(record = %handle.record_name(), "Client handle released");
        drop(handle);
    }
}

/// Filter accepting only `http-endpoint` records.
pub fn http_endpoints(record: &EndpointRecord) -> bool {
    record.is_http_endpoint()
}
