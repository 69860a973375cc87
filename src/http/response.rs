//! Responses produced by the gateway itself.
//!
//! Anything that is not a relayed backend response is one of these JSON
//! bodies. None of them carries backend or registry detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Message for requests to the bare root.
pub const ROOT_MESSAGE: &str = "invalid request, this is an api gateway";
/// Message for prefixes no backend has claimed.
pub const NOT_FOUND_MESSAGE: &str = "not found";

/// `{"message": <message>}` with the given status.
pub fn json_message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// 404 with a message.
pub fn not_found(message: &str) -> Response {
    json_message(StatusCode::NOT_FOUND, message)
}

/// The uniform fallback: 502 `{"error":"bad_gateway"}`.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": "bad_gateway" }))).into_response()
}

/// 400 for bodies that could not be read.
pub fn bad_request() -> Response {
    json_message(StatusCode::BAD_REQUEST, "failed to read request body")
}

/// 413 for bodies over the configured limit.
pub fn payload_too_large() -> Response {
    json_message(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
}
