//! Shared key-value store subsystem.
//!
//! # Data Flow
//! ```text
//! CircuitBreaker ──┐                  ┌─▶ redis.rs  (production, shared across processes)
//!                  ├─▶ KeyValueStore ─┤
//! CacheAside ──────┘                  └─▶ memory.rs (tests, local runs)
//! ```
//!
//! # Design Decisions
//! - One store serves both breaker state and cached payloads; key prefixes keep them apart
//! - The store is injected as `Arc<dyn KeyValueStore>`, never a global
//! - `incr` creates missing keys at zero, so counters need no setup step

pub mod memory;
pub mod redis;
pub mod types;

use async_trait::async_trait;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;
pub use self::types::{StoreError, StoreResult};

/// Key-value operations shared by the breaker and the cache.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Expired keys read as `None`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value that expires `ttl_secs` after the write.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()>;

    /// Atomically increment a counter, treating a missing key as zero.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Set the expiry of an existing key. Returns `false` if the key is absent.
    async fn expire(&self, key: &str, ttl_secs: u64) -> StoreResult<bool>;

    /// Remove a key. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}
