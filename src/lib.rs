//! Registry-driven API gateway library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod resilience;
pub mod routing;
pub mod services;

pub use config::schema::AppConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use registry::InMemoryRegistry;
pub use resilience::CircuitBreaker;
