//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → sections handed to the store, breaker, cache and maps client
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Environment variables override the file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BreakerConfig, CacheConfig, LogFormat, MapsConfig, ObservabilityConfig, RedisConfig,
    ServiceConfig,
};
