//! The names service: an append-only list of JSON objects.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};

use crate::services::ServiceIdentity;

pub const IDENTITY: ServiceIdentity = ServiceIdentity {
    name: "namesservice",
    api_name: "names",
};

type Entry = Map<String, Value>;

#[derive(Debug, Default)]
pub struct NamesState {
    entries: Mutex<Vec<Entry>>,
}

impl NamesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<Entry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn add(&self, entry: Entry) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }
}

pub fn router(state: Arc<NamesState>) -> Router {
    Router::new()
        .route("/", get(list_names).post(add_name))
        .with_state(state)
}

async fn list_names(State(state): State<Arc<NamesState>>) -> Json<Vec<Entry>> {
    Json(state.list())
}

// The body is parsed by hand so callers need not send a
// `content-type: application/json` header.
async fn add_name(State(state): State<Arc<NamesState>>, body: Bytes) -> Response {
    let entry: Entry = match serde_json::from_slice(&body) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected names body");
            return (StatusCode::BAD_REQUEST, "Body must be a JSON object").into_response();
        }
    };
    state.add(entry.clone());
    (StatusCode::OK, Json(entry)).into_response()
}
