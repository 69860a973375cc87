//! Registry-driven request dispatch.
//!
//! # Responsibilities
//! - Resolve a backend for an inbound request from a fresh registry snapshot
//! - Forward method, headers and body to the rewritten path
//! - Stream the backend response through verbatim, or fail on a server error
//! - Release the backend handle on every exit path
//!
//! One call to [`Dispatcher::dispatch`] is one execution unit for the
//! circuit breaker: any `Err` it returns is a breaker failure, routing
//! misses are not.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::uri::InvalidUri;
use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use thiserror::Error;

use crate::http::request::{request_id, InboundRequest};
use crate::http::response::{self, NOT_FOUND_MESSAGE, ROOT_MESSAGE};
use crate::registry::{http_endpoints, ClientHandle, RegistryError, ServiceRegistry};
use crate::routing::{route_path, PathRoute, RoutingKeyMatcher};

/// Header carrying the encoded caller principal to backends.
pub const USER_PRINCIPAL: HeaderName = HeaderName::from_static("user-principal");

/// Bytes of a failing backend body kept for diagnostics.
const EXCERPT_LEN: usize = 256;

/// Why a dispatch failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid backend uri: {0}")]
    Uri(#[from] InvalidUri),

    #[error("failed to build backend request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("backend request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// Backend answered with a 5xx status.
    #[error("upstream server error {status}: {excerpt}")]
    UpstreamServerError { status: StatusCode, excerpt: String },
}

/// Resolves and proxies inbound requests. Holds no mutable state.
pub struct Dispatcher {
    registry: Arc<dyn ServiceRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatch one request.
    pub async fn dispatch(&self, request: InboundRequest) -> Result<Response, DispatchError> {
        let (prefix, forward_path) = match route_path(request.uri.path(), request.uri.query()) {
            PathRoute::Root => return Ok(response::not_found(ROOT_MESSAGE)),
            PathRoute::Prefixed { prefix, forward_path } => (prefix.to_string(), forward_path),
        };

        let records = self.registry.query_all(&http_endpoints).await?;
        for record in &records {
            tracing::trace!(
                name = %record.name,
                api_name = record.routing_key().unwrap_or("-"),
                location = %record.location.authority(),
                "Registry record"
            );
        }

        let record = match RoutingKeyMatcher::new(&prefix).select(&records) {
            Some(record) => record,
            None => {
                tracing::debug!(
                    request_id = %request_id(&request.headers),
                    prefix = %prefix,
                    candidates = records.len(),
                    "No record matches prefix"
                );
                return Ok(response::not_found(NOT_FOUND_MESSAGE));
            }
        };

        tracing::debug!(
            request_id = %request_id(&request.headers),
            prefix = %prefix,
            backend = %record.name,
            path = %forward_path,
            "Forwarding request"
        );

        let handle = self.registry.acquire_client(record)?;
        let result = self.forward(&handle, request, &forward_path).await;
        self.registry.release(handle);
        result
    }

    async fn forward(
        &self,
        handle: &ClientHandle,
        request: InboundRequest,
        path: &str,
    ) -> Result<Response, DispatchError> {
        let uri = handle.uri_for(path)?;
        let mut builder = Request::builder().method(request.method).uri(uri);

        if let Some(headers) = builder.headers_mut() {
            *headers = request.headers;
            // Only the gateway may assert who the caller is
            headers.remove(USER_PRINCIPAL);
            if let Some(principal) = &request.principal {
                match HeaderValue::from_str(&principal.encode()) {
                    Ok(value) => {
                        headers.insert(USER_PRINCIPAL, value);
                    }
                    Err(e) => tracing::warn!(error = %e, "Principal is not a valid header value, not forwarded"),
                }
            }
        }

        let backend_request = builder.body(Body::from(request.body))?;
        let backend_response = handle.send(backend_request).await?;

        let (parts, body) = backend_response.into_parts();
        if parts.status.as_u16() >= 500 {
            return Err(DispatchError::UpstreamServerError {
                status: parts.status,
                excerpt: read_excerpt(body).await,
            });
        }

        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// First [`EXCERPT_LEN`] bytes of `body`; the rest is never read.
async fn read_excerpt<B>(mut body: B) -> String
where
    B: hyper::body::Body<Data = Bytes> + Unpin,
{
    let mut excerpt = Vec::with_capacity(EXCERPT_LEN);
    while excerpt.len() < EXCERPT_LEN {
        let Some(Ok(frame)) = body.frame().await else {
            break;
        };
        if let Some(data) = frame.data_ref() {
            let take = data.len().min(EXCERPT_LEN - excerpt.len());
            excerpt.extend_from_slice(&data[..take]);
        }
    }
    String::from_utf8_lossy(&excerpt).into_owned()
}
