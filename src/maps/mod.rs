//! Google Maps integration.
//!
//! # Data Flow
//! ```text
//! MapsService::distance_from_home(email, home, current)
//!     → CacheAside (key: distance_from_home + email + rounded current position)
//!     → on miss: CircuitBreaker::execute("google_maps_distance", ...)
//!     → MapsClient::distance (HTTP, 5 s timeout)
//! ```

pub mod client;
pub mod service;
pub mod types;

pub use client::{MapsClient, UNKNOWN_LOCATION};
pub use service::{GuardedResult, MapsService};
pub use types::{Address, Coordinates, Distance, DistanceFromHome, MapsError, Prediction};
