//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;

use api_gateway::config::{CircuitBreakerConfig, GatewayConfig, HttpConfig};
use api_gateway::registry::{EndpointRecord, ServiceRegistry};
use api_gateway::{CircuitBreaker, GatewayServer, InMemoryRegistry, Shutdown};

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    /// Path and query.
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Captured {
        self.captured
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("backend received no request")
    }

    /// A record pointing at this backend.
    pub fn record(&self, name: &str, api_name: &str) -> EndpointRecord {
        EndpointRecord::http_endpoint(name, "127.0.0.1", self.addr.port(), "/").with_api_name(api_name)
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// Every request is recorded, then answered by `f`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(Captured) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let captured = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let router = {
        let calls = calls.clone();
        let captured = captured.clone();
        Router::new().fallback(move |request: Request<Body>| {
            let calls = calls.clone();
            let captured = captured.clone();
            let f = f.clone();
            async move {
                let (parts, body) = request.into_parts();
                let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
                let request = Captured {
                    method: parts.method.to_string(),
                    uri: parts
                        .uri
                        .path_and_query()
                        .map(|pq| pq.as_str().to_string())
                        .unwrap_or_default(),
                    headers: parts.headers,
                    body,
                };
                calls.fetch_add(1, Ordering::SeqCst);
                captured.lock().unwrap().push(request.clone());
                f(request).await
            }
        })
    };

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    MockBackend {
        addr,
        calls,
        captured,
    }
}

/// Start a mock backend that always answers `status` with `body`.
pub async fn start_mock_backend(status: u16, body: &'static str) -> MockBackend {
    start_programmable_backend(move |_| async move {
        Response::builder()
            .status(status)
            .header("content-type", "text/plain")
            .body(Body::from(body))
            .unwrap()
    })
    .await
}

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub breaker: Arc<CircuitBreaker>,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Breaker settings with test-friendly timings.
pub fn breaker_config(max_failures: u32, timeout_ms: u64, reset_timeout_ms: u64) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        name: "test-breaker".to_string(),
        max_failures,
        timeout_ms,
        reset_timeout_ms,
    }
}

/// Start a gateway reading from `registry`.
pub async fn start_gateway(
    registry: Arc<dyn ServiceRegistry>,
    circuit_breaker: CircuitBreakerConfig,
) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = GatewayConfig {
        http: HttpConfig {
            address: "127.0.0.1".to_string(),
            port: addr.port(),
            ..HttpConfig::default()
        },
        circuit_breaker,
    };

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config, registry);
    let breaker = server.breaker();
    tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestGateway {
        addr,
        breaker,
        shutdown,
    }
}

/// A fresh registry holding `records`, in order.
pub async fn registry_with(records: Vec<EndpointRecord>) -> Arc<InMemoryRegistry> {
    let registry = Arc::new(InMemoryRegistry::new());
    for record in records {
        registry.publish(record).await.unwrap();
    }
    registry
}

/// HTTP client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
