//! Client handles bound to a single endpoint record.
//!
//! # Responsibilities
//! - Bind a shared HTTP client to one backend's `host:port`
//! - Count outstanding handles so leaks are observable
//! - Release exactly once, whichever way the holder exits

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use url::Url;

use crate::registry::record::{EndpointRecord, Location};
use crate::registry::RegistryError;

/// Shared HTTP client type used for every backend.
pub type HttpClient = Client<HttpConnector, Body>;

/// Counts handles that have been acquired but not yet released.
#[derive(Debug, Clone, Default)]
pub struct HandleTracker {
    outstanding: Arc<AtomicUsize>,
}

impl HandleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an acquisition. The returned lease releases on drop.
    pub fn lease(&self) -> Lease {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        Lease {
            outstanding: Arc::clone(&self.outstanding),
        }
    }

    /// Handles currently held by callers.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

/// One acquisition counted by a [`HandleTracker`].
#[derive(Debug)]
pub struct Lease {
    outstanding: Arc<AtomicUsize>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A client bound to one backend.
///
/// Dropping the handle releases it; [`ServiceRegistry::release`] is the
/// explicit form of the same thing.
///
/// [`ServiceRegistry::release`]: crate::registry::ServiceRegistry::release
#[derive(Debug)]
pub struct ClientHandle {
    record_name: String,
    location: Location,
    base: Url,
    client: HttpClient,
    _lease: Lease,
}

impl ClientHandle {
    /// Bind `client` to `record`. Fails if the record has no usable address.
    pub fn new(record: &EndpointRecord, client: HttpClient, lease: Lease) -> Result<Self, RegistryError> {
        let location = &record.location;
        if location.host.is_empty() || location.port == 0 {
            return Err(RegistryError::InvalidRecord {
                name: record.name.clone(),
                reason: format!("unusable address '{}'", location.authority()),
            });
        }
        let base = location.base_url().map_err(|e| RegistryError::InvalidRecord {
            name: record.name.clone(),
            reason: format!("invalid base url: {e}"),
        })?;
        Ok(Self {
            record_name: record.name.clone(),
            location: location.clone(),
            base,
            client,
            _lease: lease,
        })
    }

    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    /// `host:port` of the bound backend.
    pub fn authority(&self) -> String {
        self.location.authority()
    }

    /// Absolute URI for `path_and_query` on the bound backend.
    pub fn uri_for(&self, path_and_query: &str) -> Result<Uri, axum::http::uri::InvalidUri> {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        let mut url = self.base.clone();
        url.set_path(&self.location.join(path));
        url.set_query(query);
        url.as_str().parse()
    }

    /// Send a request whose URI was produced by [`ClientHandle::uri_for`].
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Incoming>, hyper_util::client::legacy::Error> {
        self.client.request(request).await
    }
}
