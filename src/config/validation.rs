//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds and TTLs > 0)
//! - Check URLs parse
//!
//! Returns every error found, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;

/// Largest accepted cache key precision.
pub const MAX_KEY_PRECISION: u32 = 10;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be at least {min}")]
    TooSmall { field: &'static str, min: u64 },

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("{field} is not a valid URL: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("{field} has unsupported scheme '{scheme}'")]
    UnsupportedScheme { field: &'static str, scheme: String },

    #[error("{field} is not a socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    at_least(&mut errors, "breaker.fail_max", config.breaker.fail_max, 1);
    at_least(&mut errors, "breaker.reset_timeout_secs", config.breaker.reset_timeout_secs, 1);
    at_least(&mut errors, "cache.default_ttl_secs", config.cache.default_ttl_secs, 1);
    if config.cache.key_precision > MAX_KEY_PRECISION {
        errors.push(ValidationError::TooLarge {
            field: "cache.key_precision",
            max: MAX_KEY_PRECISION as u64,
        });
    }
    at_least(&mut errors, "maps.request_timeout_secs", config.maps.request_timeout_secs, 1);
    at_least(&mut errors, "redis.connect_timeout_secs", config.redis.connect_timeout_secs, 1);
    at_least(&mut errors, "redis.connect_attempts", config.redis.connect_attempts as u64, 1);

    check_url(&mut errors, "redis.url", &config.redis.url, &["redis", "rediss"]);
    check_url(&mut errors, "maps.base_url", &config.maps.base_url, &["http", "https"]);

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn at_least(errors: &mut Vec<ValidationError>, field: &'static str, value: u64, min: u64) {
    if value < min {
        errors.push(ValidationError::TooSmall { field, min });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str, schemes: &[&str]) {
    match Url::parse(value) {
        Ok(url) if schemes.contains(&url.scheme()) => {}
        Ok(url) => errors.push(ValidationError::UnsupportedScheme {
            field,
            scheme: url.scheme().to_string(),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            reason: e.to_string(),
        }),
    }
}
