//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: any method on any path goes to the gateway handler
//! - Wire up middleware (request ID, tracing)
//! - Buffer inbound bodies, then run the dispatcher under the circuit breaker
//! - Publish the gateway's own record once the listener is bound

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::dispatcher::Dispatcher;
use crate::http::request::{request_id, BodyError, InboundRequest, MakeRequestUuid};
use crate::http::response;
use crate::observability::metrics;
use crate::registry::{EndpointRecord, ServiceRegistry};
use crate::resilience::{CircuitBreaker, CircuitError};

/// Name the gateway publishes itself under.
pub const GATEWAY_RECORD_NAME: &str = "api-gateway";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub breaker: Arc<CircuitBreaker>,
    pub max_body_bytes: usize,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    registry: Arc<dyn ServiceRegistry>,
    breaker: Arc<CircuitBreaker>,
}

impl GatewayServer {
    /// Create a gateway reading backends from `registry`.
    pub fn new(config: GatewayConfig, registry: Arc<dyn ServiceRegistry>) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(&config.circuit_breaker));
        let dispatcher = Arc::new(Dispatcher::new(registry.clone()));

        let state = AppState {
            dispatcher,
            breaker: breaker.clone(),
            max_body_bytes: config.http.max_body_bytes,
        };

        Self {
            router: Self::build_router(state),
            config,
            registry,
            breaker,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The breaker shared by every dispatch.
    pub fn breaker(&self) -> Arc<CircuitBreaker> {
        self.breaker.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            circuit = %self.breaker.name(),
            "Gateway listening"
        );

        let record = EndpointRecord::http_endpoint(
            GATEWAY_RECORD_NAME,
            self.config.http.address.clone(),
            addr.port(),
            "/",
        );
        if let Err(e) = self.registry.publish(record).await {
            tracing::error!(error = %e, "Failed to publish gateway record");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Gateway draining");
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Buffers the request and dispatches it under the breaker.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let rid = request_id(request.headers()).to_string();

    let inbound = match InboundRequest::from_request(request, state.max_body_bytes).await {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::warn!(request_id = %rid, error = %e, "Failed to buffer request body");
            let response = match e {
                BodyError::TooLarge { .. } => response::payload_too_large(),
                BodyError::Read(_) => response::bad_request(),
            };
            metrics::record_request(method.as_str(), response.status().as_u16(), "rejected", start);
            return response;
        }
    };

    let dispatcher = &state.dispatcher;
    let (response, outcome) = state
        .breaker
        .execute_with_fallback(
            || async move { dispatcher.dispatch(inbound).await.map(|r| (r, "dispatched")) },
            |err| {
                match &err {
                    CircuitError::Open(_) => {
                        let snapshot = state.breaker.snapshot();
                        tracing::warn!(
                            request_id = %rid,
                            circuit = %snapshot.name,
                            state = %snapshot.state,
                            failures = snapshot.failures,
                            path = %path,
                            "Circuit open, short-circuiting to fallback"
                        )
                    }
                    CircuitError::Timeout(after) => tracing::error!(
                        request_id = %rid,
                        path = %path,
                        timeout = ?after,
                        "Dispatch timed out"
                    ),
                    CircuitError::Failed(e) => tracing::error!(
                        request_id = %rid,
                        path = %path,
                        error = %e,
                        "Dispatch failed"
                    ),
                }
                (response::bad_gateway(), err.kind())
            },
        )
        .await;

    metrics::record_request(method.as_str(), response.status().as_u16(), outcome, start);
    response
}
