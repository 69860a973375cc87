//! The fruits service: an append-only list of fruit names.
//!
//! - `GET /` lists fruits as `[{"name": ...}]`
//! - `GET /add/{name}` appends and lists; `400 Not allowed` if the name is
//!   blank or already present

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::services::ServiceIdentity;

pub const IDENTITY: ServiceIdentity = ServiceIdentity {
    name: "fruitsservice",
    api_name: "fruits",
};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Fruit {
    pub name: String,
}

/// The list, starting with `orange`.
#[derive(Debug)]
pub struct FruitsState {
    fruits: Mutex<Vec<String>>,
}

impl FruitsState {
    pub fn new() -> Self {
        Self::with_fruits(vec!["orange".to_string()])
    }

    pub fn with_fruits(fruits: Vec<String>) -> Self {
        Self {
            fruits: Mutex::new(fruits),
        }
    }

    pub fn list(&self) -> Vec<Fruit> {
        self.fruits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|name| Fruit { name: name.clone() })
            .collect()
    }

    /// Append `name` unless it is blank or already listed.
    pub fn add(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        let mut fruits = self.fruits.lock().unwrap_or_else(PoisonError::into_inner);
        if fruits.iter().any(|existing| existing == name) {
            return false;
        }
        fruits.push(name.to_string());
        true
    }
}

impl Default for FruitsState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: Arc<FruitsState>) -> Router {
    Router::new()
        .route("/", get(list_fruits))
        .route("/add/{name}", get(add_fruit))
        .with_state(state)
}

async fn list_fruits(State(state): State<Arc<FruitsState>>) -> Json<Vec<Fruit>> {
    Json(state.list())
}

async fn add_fruit(State(state): State<Arc<FruitsState>>, Path(name): Path<String>) -> Response {
    if !state.add(&name) {
        tracing::debug!(fruit = %name, "Rejected fruit");
        return (StatusCode::BAD_REQUEST, "Not allowed").into_response();
    }
    tracing::info!(fruit = %name, "Fruit added");
    Json(state.list()).into_response()
}
