//! Startup orchestration.
//!
//! Subsystems start in dependency order: registry first, then the demo
//! services, then the gateway. Any bind failure is fatal.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::http::GatewayServer;
use crate::lifecycle::Shutdown;
use crate::registry::{InMemoryRegistry, ServiceRegistry};
use crate::resilience::CircuitBreaker;
use crate::services::{self, fruits, names};

/// Handles to a started system.
pub struct Running {
    /// Address the gateway is bound to.
    pub gateway_addr: SocketAddr,
    pub registry: Arc<InMemoryRegistry>,
    pub breaker: Arc<CircuitBreaker>,
    tasks: Vec<(&'static str, JoinHandle<Result<(), std::io::Error>>)>,
}

impl Running {
    /// Wait for every server task to finish.
    pub async fn wait(self) {
        for (name, task) in self.tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(task = name, error = %e, "Server exited with error"),
                Err(e) => tracing::error!(task = name, error = %e, "Server task panicked"),
            }
        }
    }
}

/// Bind and spawn every configured server.
pub async fn start(config: AppConfig, shutdown: &Shutdown) -> Result<Running, std::io::Error> {
    let registry = Arc::new(InMemoryRegistry::new());
    let mut tasks = Vec::new();

    if config.services.enabled {
        let host = config.services.host.clone();

        let listener = TcpListener::bind((host.as_str(), config.services.fruits_port)).await?;
        tasks.push((
            fruits::IDENTITY.name,
            tokio::spawn(services::serve_and_publish(
                fruits::IDENTITY,
                fruits::router(Arc::new(fruits::FruitsState::new())),
                listener,
                host.clone(),
                registry.clone(),
                shutdown.subscribe(),
            )),
        ));

        let listener = TcpListener::bind((host.as_str(), config.services.names_port)).await?;
        tasks.push((
            names::IDENTITY.name,
            tokio::spawn(services::serve_and_publish(
                names::IDENTITY,
                names::router(Arc::new(names::NamesState::new())),
                listener,
                host.clone(),
                registry.clone(),
                shutdown.subscribe(),
            )),
        ));
    }

    let gateway_config = config.api.gateway.clone();
    let listener = TcpListener::bind(gateway_config.http.bind_address()).await?;
    let gateway_addr = listener.local_addr()?;

    tracing::info!(
        address = %gateway_addr,
        max_failures = gateway_config.circuit_breaker.max_failures,
        timeout_ms = gateway_config.circuit_breaker.timeout_ms,
        reset_timeout_ms = gateway_config.circuit_breaker.reset_timeout_ms,
        "Gateway configured"
    );

    let server = GatewayServer::new(gateway_config, registry.clone());
    let breaker = server.breaker();
    tasks.push(("api-gateway", tokio::spawn(server.run(listener, shutdown.subscribe()))));

    Ok(Running {
        gateway_addr,
        registry,
        breaker,
        tasks,
    })
}
