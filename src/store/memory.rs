//! In-process store with lazy TTL expiry.
//!
//! # Responsibilities
//! - Stand in for Redis in tests and local runs
//! - Honor the same TTL and counter semantics as the Redis backend
//!
//! Expiry uses `tokio::time::Instant`, so paused-clock tests can move past a TTL
//! with `tokio::time::advance` instead of sleeping.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::store::types::{StoreError, StoreResult};
use crate::store::KeyValueStore;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn persistent(value: String) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// A thread-safe in-memory key-value store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining time to live of a key, if it exists and has an expiry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entry = self.entries.get(key)?;
        match entry.expires_at {
            Some(at) if at > now => Some(at - now),
            _ => None,
        }
    }

    /// Number of live (unexpired) keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|r| !r.value().is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_if_expired(&self, key: &str, now: Instant) {
        self.entries.remove_if(key, |_, v| v.is_expired(now));
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = Instant::now();
        let found = self
            .entries
            .get(key)
            .map(|r| (r.value().is_expired(now), r.value().value.clone()));

        match found {
            Some((false, value)) => Ok(Some(value)),
            Some((true, _)) => {
                self.purge_if_expired(key, now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: Some(expires_at),
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| StoredValue::persistent("0".to_string()));

        if entry.is_expired(now) {
            *entry = StoredValue::persistent("0".to_string());
        }

        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| StoreError::InvalidValue {
                key: key.to_string(),
                reason: "value is not an integer".to_string(),
            })?;
        let next = current.checked_add(1).ok_or_else(|| StoreError::InvalidValue {
            key: key.to_string(),
            reason: "increment would overflow".to_string(),
        })?;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> StoreResult<bool> {
        let now = Instant::now();
        let updated = match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired(now) => {
                entry.expires_at = Some(now + Duration::from_secs(ttl_secs));
                true
            }
            _ => false,
        };
        if !updated {
            self.purge_if_expired(key, now);
        }
        Ok(updated)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
