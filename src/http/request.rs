//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the caller did not send one
//! - Buffer the body before dispatch, within the configured limit
//! - Carry the caller principal, if an upstream layer resolved one
//!
//! The original request headers are kept as-is (order and duplicates
//! included) so they can be forwarded verbatim.

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, Method, Request, Uri};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Read the request ID header, if any.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
}

/// Authenticated caller identity.
///
/// Inserted into request extensions by an authentication layer in front of
/// the gateway. The gateway only forwards it.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal(pub serde_json::Value);

impl Principal {
    /// Compact JSON encoding, as sent in the `user-principal` header.
    pub fn encode(&self) -> String {
        self.0.to_string()
    }
}

/// Why an inbound body could not be buffered.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The caller went away or sent a malformed body.
    #[error("failed to read request body: {0}")]
    Read(axum::BoxError),
}

/// A fully buffered inbound request.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub principal: Option<Principal>,
}

impl InboundRequest {
    /// Buffer `request`, failing if the body exceeds `limit` bytes or
    /// cannot be read.
    pub async fn from_request(request: Request<Body>, limit: usize) -> Result<Self, BodyError> {
        let (parts, body) = request.into_parts();
        let body = match Limited::new(body, limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => return Err(BodyError::TooLarge { limit }),
            Err(e) => return Err(BodyError::Read(e)),
        };
        Ok(Self {
            principal: parts.extensions.get::<Principal>().cloned(),
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        })
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }
}
