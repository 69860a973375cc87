//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. Every problem is
//! reported, not just the first one.

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    BadAddress { field: &'static str, value: String },
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let gateway = config.gateway();

    if gateway.http.address.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "api.gateway.http.address" });
    }
    if gateway.http.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "api.gateway.http.max_body_bytes" });
    }

    let breaker = &gateway.circuit_breaker;
    if breaker.name.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "api.gateway.circuit_breaker.name" });
    }
    if breaker.max_failures == 0 {
        errors.push(ValidationError::Zero { field: "api.gateway.circuit_breaker.max_failures" });
    }
    if breaker.timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "api.gateway.circuit_breaker.timeout_ms" });
    }
    if breaker.reset_timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "api.gateway.circuit_breaker.reset_timeout_ms" });
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if config.services.enabled && config.services.host.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "services.host" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
