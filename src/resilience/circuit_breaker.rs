//! Circuit breaker wrapping each dispatch.
//!
//! # States
//! - Closed: normal operation, executions pass through
//! - Open: executions fail fast, the wrapped operation is never invoked
//! - Half-Open: one probe execution decides whether to close again
//!
//! # State Transitions
//! ```text
//! Closed → Open: accumulated failures >= max_failures
//! Open → Half-Open: reset_timeout elapsed since entering Open
//! Half-Open → Closed: probe succeeds
//! Half-Open → Open: probe fails (reset timer restarts)
//! ```
//!
//! One breaker is shared by every request. Its state sits behind a mutex
//! that is never held across an await point.

use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }

    /// Numeric form used for the state gauge.
    pub fn as_gauge(&self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::Open => 1.0,
            CircuitState::HalfOpen => 2.0,
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an execution did not produce a value.
#[derive(Debug, Error)]
pub enum CircuitError<E> {
    /// Short-circuited: the operation was not invoked.
    #[error("circuit '{0}' is open")]
    Open(String),

    /// The operation did not finish within the execution timeout.
    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    /// The operation finished with an error.
    #[error("execution failed: {0}")]
    Failed(E),
}

impl<E> CircuitError<E> {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CircuitError::Open(_) => "open",
            CircuitError::Timeout(_) => "timeout",
            CircuitError::Failed(_) => "failed",
        }
    }
}

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub failures: u32,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// A named breaker shared across all executions.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    max_failures: u32,
    timeout: Duration,
    reset_timeout: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(config: &CircuitBreakerConfig) -> Self {
        metrics::record_circuit_state(&config.name, CircuitState::Closed);
        Self {
            name: config.name.clone(),
            max_failures: config.max_failures.max(1),
            timeout: config.timeout(),
            reset_timeout: config.reset_timeout(),
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failures: 0,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state. An open breaker whose reset timeout has elapsed is
    /// reported (and moved to) half-open.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        self.maybe_half_open(&mut inner);
        inner.state
    }

    /// Failures counted since the last reset.
    pub fn failure_count(&self) -> u32 {
        self.lock().failures
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let mut inner = self.lock();
        self.maybe_half_open(&mut inner);
        CircuitSnapshot {
            name: self.name.clone(),
            state: inner.state,
            failures: inner.failures,
        }
    }

    /// Run `operation` under the breaker.
    ///
    /// The operation is invoked only when the breaker admits the call. It is
    /// cancelled (dropped) if it exceeds the execution timeout, which counts
    /// as a failure.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut permit = match self.admit() {
            Some(permit) => permit,
            None => {
                tracing::debug!(circuit = %self.name, "Execution short-circuited");
                return Err(CircuitError::Open(self.name.clone()));
            }
        };

        match tokio::time::timeout(self.timeout, operation()).await {
            Ok(Ok(value)) => {
                permit.succeed();
                Ok(value)
            }
            Ok(Err(err)) => {
                permit.fail();
                Err(CircuitError::Failed(err))
            }
            Err(_) => {
                permit.fail();
                Err(CircuitError::Timeout(self.timeout))
            }
        }
    }

    /// Like [`CircuitBreaker::execute`], but every error, including a
    /// short-circuit, is turned into a value by `fallback`.
    pub async fn execute_with_fallback<T, E, F, Fut, FB>(&self, operation: F, fallback: FB) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        FB: FnOnce(CircuitError<E>) -> T,
    {
        match self.execute(operation).await {
            Ok(value) => value,
            Err(err) => fallback(err),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self) -> Option<Permit<'_>> {
        let mut inner = self.lock();
        self.maybe_half_open(&mut inner);

        match inner.state {
            CircuitState::Closed => Some(Permit::new(self, false)),
            CircuitState::Open => None,
            CircuitState::HalfOpen if inner.probe_in_flight => None,
            CircuitState::HalfOpen => {
                inner.probe_in_flight = true;
                tracing::info!(circuit = %self.name, "Letting probe execution through");
                Some(Permit::new(self, true))
            }
        }
    }

    fn maybe_half_open(&self, inner: &mut Inner) {
        if inner.state != CircuitState::Open {
            return;
        }
        let elapsed = inner.opened_at.map(|at| at.elapsed()).unwrap_or(Duration::MAX);
        if elapsed >= self.reset_timeout {
            self.transition(inner, CircuitState::HalfOpen);
            inner.probe_in_flight = false;
        }
    }

    fn on_success(&self, probe: bool) {
        let mut inner = self.lock();
        match inner.state {
            // Failures accumulate while closed; only a probe resets them
            CircuitState::Closed => {}
            CircuitState::HalfOpen if probe => {
                inner.failures = 0;
                inner.probe_in_flight = false;
                inner.opened_at = None;
                self.transition(&mut inner, CircuitState::Closed);
            }
            // Stale report from an execution admitted before the circuit opened
            _ => {}
        }
    }

    fn on_failure(&self, probe: bool) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.failures += 1;
                tracing::debug!(circuit = %self.name, failures = inner.failures, "Execution failed");
                if inner.failures >= self.max_failures {
                    inner.opened_at = Some(Instant::now());
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
            CircuitState::HalfOpen if probe => {
                inner.failures += 1;
                inner.probe_in_flight = false;
                inner.opened_at = Some(Instant::now());
                self.transition(&mut inner, CircuitState::Open);
            }
            _ => {}
        }
    }

    fn on_abandoned(&self, probe: bool) {
        if probe {
            let mut inner = self.lock();
            if inner.state == CircuitState::HalfOpen {
                inner.probe_in_flight = false;
            }
        }
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        let from = inner.state;
        if from == to {
            return;
        }
        inner.state = to;

        match to {
            CircuitState::Open => tracing::warn!(
                circuit = %self.name,
                from = %from,
                failures = inner.failures,
                reset_timeout = ?self.reset_timeout,
                "Circuit opened"
            ),
            _ => tracing::info!(circuit = %self.name, from = %from, to = %to, "Circuit state transition"),
        }
        metrics::record_circuit_transition(&self.name, from, to);
    }
}

/// Admission ticket for one execution. Reports its outcome exactly once;
/// an unreported ticket (the execution future was dropped) only frees the
/// probe slot.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    reported: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, probe: bool) -> Self {
        Self {
            breaker,
            probe,
            reported: false,
        }
    }

    fn succeed(&mut self) {
        self.reported = true;
        self.breaker.on_success(self.probe);
    }

    fn fail(&mut self) {
        self.reported = true;
        self.breaker.on_failure(self.probe);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.reported {
            self.breaker.on_abandoned(self.probe);
        }
    }
}
