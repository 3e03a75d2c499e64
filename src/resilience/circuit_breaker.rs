//! Circuit breaker for outbound dependency calls.
//!
//! # States
//! - Closed: normal operation, calls pass through (also the meaning of "no state stored")
//! - Open: dependency assumed down, calls fail fast
//!
//! # State Transitions
//! ```text
//! Closed → Open:   failure count >= fail_max within the counter's TTL window
//! Open → Closed:   `cb:<name>:state` expires after reset_timeout_secs
//! ```
//!
//! # Design Decisions
//! - Per-operation breaker (keyed by name), state held in the shared store
//! - Failure counting uses the store's atomic `incr`; the pre-call state read is a
//!   plain read, so callers racing a trip may each send one more call
//! - Store errors never block a call: unreadable state counts as Closed

use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use crate::observability::metrics;
use crate::store::{KeyValueStore, StoreResult};

pub use crate::config::schema::BreakerConfig;

const OPEN: &str = "open";

/// Breaker state for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
}

impl BreakerState {
    fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(OPEN) => BreakerState::Open,
            _ => BreakerState::Closed,
        }
    }
}

/// Snapshot of a breaker, for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerStatus {
    pub operation: String,
    pub state: BreakerState,
    pub failure_count: i64,
}

/// Outcome of a guarded call that did not succeed.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The breaker is open; the remote call was not made.
    #[error("Circuit '{operation}' is open, skipping external call")]
    Open { operation: String },

    /// The remote call failed. The error is passed through as-is.
    #[error("{0}")]
    Remote(E),
}

impl<E> BreakerError<E> {
    /// True if the call was short-circuited.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open { .. })
    }

    /// The downstream error, if the remote call was made.
    pub fn remote(&self) -> Option<&E> {
        match self {
            BreakerError::Remote(e) => Some(e),
            BreakerError::Open { .. } => None,
        }
    }

    pub fn into_remote(self) -> Option<E> {
        match self {
            BreakerError::Remote(e) => Some(e),
            BreakerError::Open { .. } => None,
        }
    }
}

struct CircuitKeys {
    state: String,
    failures: String,
}

impl CircuitKeys {
    fn new(operation: &str) -> Self {
        Self {
            state: format!("cb:{}:state", operation),
            failures: format!("cb:{}:failures", operation),
        }
    }
}

/// Store-backed circuit breaker shared by all guarded operations.
#[derive(Clone)]
pub struct CircuitBreaker {
    store: Arc<dyn KeyValueStore>,
    config: BreakerConfig,
}

impl CircuitBreaker {
    pub fn new(store: Arc<dyn KeyValueStore>, config: BreakerConfig) -> Self {
        Self { store, config }
    }

    /// Run `remote_call` under the breaker for `operation`.
    ///
    /// Fails with [`BreakerError::Open`] without invoking the call while the
    /// breaker is open. Otherwise the call runs; success clears the failure
    /// count, failure increments it (tripping at `fail_max`) and is returned
    /// as [`BreakerError::Remote`].
    pub async fn execute<T, E, F, Fut>(
        &self,
        operation: &str,
        remote_call: F,
    ) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let keys = CircuitKeys::new(operation);

        if self.read_state(operation, &keys).await == BreakerState::Open {
            tracing::debug!(operation, "Circuit open, skipping call");
            metrics::record_short_circuit(operation);
            return Err(BreakerError::Open {
                operation: operation.to_string(),
            });
        }

        match remote_call().await {
            Ok(value) => {
                metrics::record_breaker_call(operation, "success");
                self.record_success(operation, &keys).await;
                Ok(value)
            }
            Err(err) => {
                metrics::record_breaker_call(operation, "failure");
                self.record_failure(operation, &keys, &err).await;
                Err(BreakerError::Remote(err))
            }
        }
    }

    /// Current state and failure count for `operation`.
    pub async fn status(&self, operation: &str) -> StoreResult<BreakerStatus> {
        let keys = CircuitKeys::new(operation);
        let state = self.store.get(&keys.state).await?;
        let failures = self.store.get(&keys.failures).await?;

        Ok(BreakerStatus {
            operation: operation.to_string(),
            state: BreakerState::from_stored(state.as_deref()),
            failure_count: failures.and_then(|v| v.parse().ok()).unwrap_or(0),
        })
    }

    async fn read_state(&self, operation: &str, keys: &CircuitKeys) -> BreakerState {
        match self.store.get(&keys.state).await {
            Ok(value) => BreakerState::from_stored(value.as_deref()),
            Err(e) => {
                tracing::warn!(operation, store = self.store.name(), error = %e, "Could not read breaker state, treating as closed");
                metrics::record_breaker_store_error(operation, "get");
                BreakerState::Closed
            }
        }
    }

    async fn record_success(&self, operation: &str, keys: &CircuitKeys) {
        if let Err(e) = self.store.delete(&keys.failures).await {
            tracing::warn!(operation, error = %e, "Could not reset breaker failure count");
            metrics::record_breaker_store_error(operation, "delete");
        }
    }

    async fn record_failure<E: Display>(&self, operation: &str, keys: &CircuitKeys, err: &E) {
        let failures = match self.store.incr(&keys.failures).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(operation, error = %e, "Could not count breaker failure");
                metrics::record_breaker_store_error(operation, "incr");
                return;
            }
        };

        if let Err(e) = self.store.expire(&keys.failures, self.config.reset_timeout_secs).await {
            tracing::warn!(operation, error = %e, "Could not set breaker failure window");
            metrics::record_breaker_store_error(operation, "expire");
        }

        tracing::debug!(operation, failures, error = %err, "Guarded call failed");

        if u64::try_from(failures).unwrap_or(0) >= self.config.fail_max {
            self.trip(operation, keys, failures).await;
        }
    }

    async fn trip(&self, operation: &str, keys: &CircuitKeys, failures: i64) {
        let reset_timeout_secs = self.config.reset_timeout_secs;
        if let Err(e) = self.store.set(&keys.state, OPEN, reset_timeout_secs).await {
            tracing::warn!(operation, error = %e, "Could not open circuit");
            metrics::record_breaker_store_error(operation, "set");
            return;
        }

        tracing::warn!(operation, failures, reset_timeout_secs, "Circuit OPEN, blocking calls");
        metrics::record_breaker_trip(operation);

        if let Err(e) = self.store.delete(&keys.failures).await {
            tracing::warn!(operation, error = %e, "Could not reset breaker failure count");
            metrics::record_breaker_store_error(operation, "delete");
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("store", &self.store.name())
            .field("fail_max", &self.config.fail_max)
            .field("reset_timeout_secs", &self.config.reset_timeout_secs)
            .finish()
    }
}
