//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Shared store connection.
    pub redis: RedisConfig,

    /// Circuit breaker thresholds.
    pub breaker: BreakerConfig,

    /// Cache-aside settings.
    pub cache: CacheConfig,

    /// Google Maps client settings.
    pub maps: MapsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Redis connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL (`redis://` or `rediss://` for TLS).
    pub url: String,

    /// Deadline for a single connection attempt in seconds.
    pub connect_timeout_secs: u64,

    /// Connection attempts before giving up.
    pub connect_attempts: u32,

    /// Base delay for exponential backoff between attempts in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay between attempts in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connect_timeout_secs: 5,
            connect_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Circuit breaker configuration, shared by every guarded operation.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BreakerConfig {
    /// Failures within one window that open the circuit.
    pub fail_max: u64,

    /// Seconds the circuit stays open; also the failure-count window.
    pub reset_timeout_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            fail_max: 5,
            reset_timeout_secs: 30,
        }
    }
}

/// Cache-aside configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for cached responses in seconds.
    pub default_ttl_secs: u64,

    /// Decimal places kept when numeric key parts are rounded.
    /// 4 places is roughly 11 m of latitude.
    pub key_precision: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 3600,
            key_precision: 4,
        }
    }
}

/// Google Maps client configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MapsConfig {
    /// API root, e.g. `https://maps.googleapis.com/maps/api`.
    pub base_url: String,

    /// Key for geocoding and distance matrix calls.
    pub api_key: String,

    /// Key for Places calls. Falls back to `api_key` when empty.
    pub places_api_key: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Idle pooled connections kept per host.
    pub max_idle_per_host: usize,
}

impl MapsConfig {
    /// Key used for Places endpoints.
    pub fn places_key(&self) -> &str {
        if self.places_api_key.is_empty() {
            &self.api_key
        } else {
            &self.places_api_key
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            api_key: String::new(),
            places_api_key: String::new(),
            request_timeout_secs: 5,
            max_idle_per_host: 20,
        }
    }
}

impl std::fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("places_api_key", &redact(&self.places_api_key))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_idle_per_host", &self.max_idle_per_host)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty for development, JSON for production.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
