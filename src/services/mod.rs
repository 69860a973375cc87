//! Demo backends.
//!
//! Two small in-memory services that publish themselves to the registry
//! once their listener is bound and then answer proxied requests. Each owns
//! its list behind a mutex injected into its handlers.

pub mod fruits;
pub mod names;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::registry::{EndpointRecord, ServiceRegistry};

/// Identity a backend publishes under.
#[derive(Debug, Clone, Copy)]
pub struct ServiceIdentity {
    /// Record name.
    pub name: &'static str,
    /// Routing key (`api.name`).
    pub api_name: &'static str,
}

/// Publish `identity` for `listener`'s port, then serve `router` until
/// `shutdown` fires.
pub async fn serve_and_publish(
    identity: ServiceIdentity,
    router: Router,
    listener: TcpListener,
    host: String,
    registry: Arc<dyn ServiceRegistry>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(service = identity.name, address = %addr, "Service started");

    let record = EndpointRecord::http_endpoint(identity.name, host, addr.port(), "/")
        .with_api_name(identity.api_name);
    if let Err(e) = registry.publish(record).await {
        tracing::error!(service = identity.name, error = %e, "Failed to publish service record");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!(service = identity.name, "Service stopped");
    Ok(())
}
