//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Port used when `REDIS_HOST` is set without `REDIS_PORT`.
pub const DEFAULT_REDIS_PORT: u16 = 16074;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: TOML file if given, defaults otherwise, then process
/// environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ServiceConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment settings onto `config`.
///
/// - `REDIS_URL` replaces the Redis URL outright.
/// - Otherwise `REDIS_HOST` (with `REDIS_PORT`, default 16074) builds a TLS URL.
/// - `GOOGLE_MAPS_API_KEY` and `GOOGLE_PLACES_API_KEY` set the Maps keys.
pub fn apply_env_overrides<F>(mut config: ServiceConfig, lookup: F) -> ServiceConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("REDIS_URL") {
        config.redis.url = url;
    } else if let Some(host) = non_empty("REDIS_HOST") {
        let port = match non_empty("REDIS_PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(_)) => {
                tracing::warn!(default = DEFAULT_REDIS_PORT, "Ignoring invalid REDIS_PORT");
                DEFAULT_REDIS_PORT
            }
            None => DEFAULT_REDIS_PORT,
        };
        config.redis.url = format!("rediss://{}:{}", host, port);
    }

    if let Some(key) = non_empty("GOOGLE_MAPS_API_KEY") {
        config.maps.api_key = key;
    }
    if let Some(key) = non_empty("GOOGLE_PLACES_API_KEY") {
        config.maps.places_api_key = key;
    }

    config
}
