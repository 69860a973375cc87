//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, breaker, registry, services:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! Backend error detail (status, body excerpt) only ever appears here,
//! never in responses.

pub mod logging;
pub mod metrics;
