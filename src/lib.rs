//! Guarded Google Maps access for the safety backend.
//!
//! Outbound Maps calls go through a store-backed circuit breaker, and
//! slowly-changing lookups sit behind a cache-aside layer with rounded keys.
//! Breaker state and cached responses share one injected key-value store
//! (Redis in production, in-memory for tests).

pub mod cache;
pub mod config;
pub mod maps;
pub mod observability;
pub mod resilience;
pub mod store;

pub use cache::{CacheAside, CacheKey, KeyPart};
pub use config::ServiceConfig;
pub use maps::MapsService;
pub use resilience::{BreakerError, CircuitBreaker};
pub use store::{KeyValueStore, MemoryStore, RedisStore};
