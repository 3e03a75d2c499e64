//! Read-through cache in front of guarded calls.
//!
//! # Flow
//! 1. Derive the key from namespace + rounded parts
//! 2. Read the store; a hit is deserialized and returned without computing
//! 3. On a miss, a corrupt entry or a read error run `compute`; store the result on success
//! 4. A failed read still writes back, so a readable value replaces whatever was there
//! 5. Write errors are logged and dropped; the computed value is still returned
//!
//! Hits never touch breaker state.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::cache::key::{CacheKey, KeyPart};
use crate::observability::metrics;
use crate::store::KeyValueStore;

pub use crate::config::schema::CacheConfig;

enum Lookup<T> {
    Hit(T),
    Miss,
    Corrupt,
    Unavailable,
}

/// Cache-aside wrapper over a shared [`KeyValueStore`].
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn KeyValueStore>,
    config: CacheConfig,
}

impl CacheAside {
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self { store, config }
    }

    /// Key that `parts` map to in `namespace`.
    pub fn key(&self, namespace: &str, parts: &[KeyPart]) -> CacheKey {
        CacheKey::derive(namespace, parts, self.config.key_precision)
    }

    /// Return the cached value for `parts`, or compute, store and return it.
    ///
    /// Errors from `compute` are returned unchanged and nothing is cached.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        namespace: &str,
        parts: &[KeyPart],
        ttl_secs: u64,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = self.key(namespace, parts);

        match self.lookup(namespace, &key).await {
            Lookup::Hit(value) => return Ok(value),
            Lookup::Miss | Lookup::Corrupt | Lookup::Unavailable => {}
        }

        let value = compute().await?;
        self.write(namespace, &key, &value, ttl_secs).await;
        Ok(value)
    }

    /// [`get_or_compute`](Self::get_or_compute) with the configured default TTL.
    pub async fn get_or_compute_default<T, E, F, Fut>(
        &self,
        namespace: &str,
        parts: &[KeyPart],
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_compute(namespace, parts, self.config.default_ttl_secs, compute)
            .await
    }

    async fn lookup<T: DeserializeOwned>(&self, namespace: &str, key: &CacheKey) -> Lookup<T> {
        let raw = match self.store.get(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %key, "Cache miss");
                metrics::record_cache_lookup(namespace, "miss");
                return Lookup::Miss;
            }
            Err(e) => {
                tracing::warn!(key = %key, store = self.store.name(), error = %e, "Cache read failed, computing without cache");
                metrics::record_cache_lookup(namespace, "error");
                metrics::record_cache_store_error(namespace, "get");
                return Lookup::Unavailable;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key = %key, "Cache hit");
                metrics::record_cache_lookup(namespace, "hit");
                Lookup::Hit(value)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Corrupt cache entry, refreshing");
                metrics::record_cache_lookup(namespace, "corrupt");
                Lookup::Corrupt
            }
        }
    }

    async fn write<T: Serialize>(&self, namespace: &str, key: &CacheKey, value: &T, ttl_secs: u64) {
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Could not serialize value for cache");
                metrics::record_cache_store_error(namespace, "serialize");
                return;
            }
        };

        if let Err(e) = self.store.set(key.as_str(), &serialized, ttl_secs).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
            metrics::record_cache_store_error(namespace, "set");
        }
    }
}

impl std::fmt::Debug for CacheAside {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAside")
            .field("store", &self.store.name())
            .field("config", &self.config)
            .finish()
    }
}
