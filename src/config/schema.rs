//! Configuration schema definitions.
//!
//! The layout mirrors the dotted keys the gateway has always been configured
//! with: `api.gateway.http.address` lives at `[api.gateway.http] address`.
//! All types derive Serde traits so a partial TOML file is enough.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// The `api.*` namespace.
    pub api: ApiConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// In-process demo backends.
    pub services: ServicesConfig,
}

impl AppConfig {
    /// Shortcut to the gateway section.
    pub fn gateway(&self) -> &GatewayConfig {
        &self.api.gateway
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    pub gateway: GatewayConfig,
}

/// Gateway configuration (`api.gateway.*`).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener settings.
    pub http: HttpConfig,

    /// Breaker wrapping every dispatch.
    pub circuit_breaker: CircuitBreakerConfig,
}

/// HTTP listener configuration (`api.gateway.http.*`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host name or IP to bind.
    pub address: String,

    /// TCP port to bind.
    pub port: u16,

    /// Largest inbound body buffered before dispatch, in bytes.
    pub max_body_bytes: usize,
}

impl HttpConfig {
    /// `address:port`, suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 8787,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Circuit breaker configuration (`api.gateway.circuit_breaker.*`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Breaker name used in logs and metric labels.
    pub name: String,

    /// Accumulated failures that open the circuit.
    pub max_failures: u32,

    /// Deadline for one execution, in milliseconds.
    pub timeout_ms: u64,

    /// Time spent open before a probe is let through, in milliseconds.
    pub reset_timeout_ms: u64,
}

impl CircuitBreakerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            name: "circuit-breaker".to_string(),
            max_failures: 5,
            timeout_ms: 10_000,
            reset_timeout_ms: 30_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Demo backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Start the fruits and names services alongside the gateway.
    pub enabled: bool,

    /// Host the services bind to and publish.
    pub host: String,

    pub fruits_port: u16,

    pub names_port: u16,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "localhost".to_string(),
            fruits_port: 8090,
            names_port: 8080,
        }
    }
}
