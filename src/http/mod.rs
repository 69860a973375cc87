//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (buffer body, capture principal)
//!     → circuit breaker admits or short-circuits
//!     → dispatcher.rs (registry lookup, forward, relay)
//!     → response.rs (gateway-generated JSON responses)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::{DispatchError, Dispatcher, USER_PRINCIPAL};
pub use request::{BodyError, InboundRequest, MakeRequestUuid, Principal, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, GATEWAY_RECORD_NAME};
