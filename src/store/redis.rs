//! Redis-backed store.
//!
//! # Responsibilities
//! - Connect to Redis (plain or TLS) with bounded, retried attempts
//! - Map the [`KeyValueStore`] operations onto single Redis commands
//!
//! `ConnectionManager` multiplexes one connection and reconnects on its own;
//! clones are cheap and share it.

use async_trait::async_trait;
use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client};

use crate::config::schema::RedisConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::timeouts::with_deadline;
use crate::store::types::{StoreError, StoreResult};
use crate::store::KeyValueStore;

/// Redis implementation of [`KeyValueStore`].
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect using the given configuration.
    ///
    /// Each attempt is bounded by `connect_timeout_secs`; failed attempts are
    /// retried with jittered exponential backoff up to `connect_attempts` times.
    pub async fn connect(config: &RedisConfig) -> StoreResult<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| StoreError::Connection(format!("invalid Redis URL: {}", e)))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = with_deadline(config.connect_timeout_secs, ConnectionManager::new(client.clone())).await;

            let err = match result {
                Ok(Ok(conn)) => {
                    tracing::info!(attempt, "Connected to Redis");
                    return Ok(Self { conn });
                }
                Ok(Err(e)) => StoreError::from(e),
                Err(_) => StoreError::Timeout(config.connect_timeout_secs),
            };

            if attempt >= config.connect_attempts {
                tracing::error!(attempt, error = %err, "Giving up connecting to Redis");
                return Err(err);
            }

            let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
            tracing::warn!(attempt, delay = ?delay, error = %err, "Redis connection failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.incr(key, 1i64).await?;
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let seconds = i64::try_from(ttl_secs).map_err(|_| StoreError::InvalidValue {
            key: key.to_string(),
            reason: format!("ttl {} out of range", ttl_secs),
        })?;
        let applied: bool = conn.expire(key, seconds).await?;
        Ok(applied)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}
