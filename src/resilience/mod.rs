//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → circuit_breaker.rs (admit, or short-circuit to fallback)
//!     → execution timeout around the whole dispatch unit
//!     → outcome reported back, state updated
//! ```
//!
//! # Design Decisions
//! - The execution timeout is the only deadline; it cancels a slow dispatch
//! - No retries: recovery comes from the open/half-open cycle alone

pub mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitError, CircuitSnapshot, CircuitState};
