//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Guarded call:
//!     → circuit_breaker.rs (read state; Open fails fast)
//!     → remote call (carries its own timeout)
//!     → circuit_breaker.rs (reset or count failure, trip at threshold)
//!
//! Store connect:
//!     → timeouts.rs (deadline per attempt)
//!     → backoff.rs (delay between attempts)
//! ```
//!
//! # Design Decisions
//! - Breaker state lives in the shared store, keyed per operation name
//! - Open clears by key expiry; there is no half-open trial call
//! - Downstream errors pass through untouched

pub mod backoff;
pub mod circuit_breaker;
pub mod timeouts;

pub use circuit_breaker::{BreakerError, BreakerConfig, BreakerState, BreakerStatus, CircuitBreaker};
