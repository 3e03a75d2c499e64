//! Guarded, cached Maps operations.
//!
//! Every outbound call runs through the circuit breaker under its own
//! operation name. Slowly-changing lookups are cached in front of the breaker,
//! so a cache hit makes no call and leaves breaker state alone.

use std::sync::Arc;

use crate::cache::{CacheAside, KeyPart};
use crate::config::ServiceConfig;
use crate::maps::client::{MapsClient, UNKNOWN_LOCATION};
use crate::maps::types::{Address, Coordinates, DistanceFromHome, MapsError, MapsResult, Prediction};
use crate::resilience::{BreakerError, CircuitBreaker};
use crate::store::KeyValueStore;

pub const AUTOCOMPLETE_OP: &str = "google_maps_autocomplete";
pub const PLACE_DETAILS_OP: &str = "google_maps_place_details";
pub const REVERSE_GEOCODE_OP: &str = "google_maps_reverse_geocode";
pub const DISTANCE_OP: &str = "google_maps_distance";

pub const PLACE_DETAILS_NS: &str = "place_details";
pub const REVERSE_GEOCODE_NS: &str = "reverse_geocode";
pub const DISTANCE_FROM_HOME_NS: &str = "distance_from_home";

/// Result of a guarded Maps operation.
pub type GuardedResult<T> = Result<T, BreakerError<MapsError>>;

/// Maps operations behind the breaker and cache.
#[derive(Clone, Debug)]
pub struct MapsService {
    client: Arc<MapsClient>,
    breaker: CircuitBreaker,
    cache: CacheAside,
}

impl MapsService {
    pub fn new(client: Arc<MapsClient>, breaker: CircuitBreaker, cache: CacheAside) -> Self {
        Self {
            client,
            breaker,
            cache,
        }
    }

    /// Wire client, breaker and cache from configuration over one shared store.
    pub fn from_config(config: &ServiceConfig, store: Arc<dyn KeyValueStore>) -> MapsResult<Self> {
        let client = Arc::new(MapsClient::new(&config.maps)?);
        let breaker = CircuitBreaker::new(store.clone(), config.breaker);
        let cache = CacheAside::new(store, config.cache);
        Ok(Self::new(client, breaker, cache))
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Place suggestions. Guarded, not cached.
    pub async fn autocomplete(&self, input: &str) -> GuardedResult<Vec<Prediction>> {
        self.breaker
            .execute(AUTOCOMPLETE_OP, || self.client.autocomplete(input))
            .await
    }

    /// Address for a place id, cached by id.
    pub async fn place_details(&self, place_id: &str) -> GuardedResult<Address> {
        self.cache
            .get_or_compute_default(PLACE_DETAILS_NS, &[KeyPart::from(place_id)], || {
                self.breaker
                    .execute(PLACE_DETAILS_OP, || self.client.place_details(place_id))
            })
            .await
    }

    /// Address at a point, cached by rounded coordinates.
    pub async fn reverse_geocode(&self, at: Coordinates) -> GuardedResult<Option<Address>> {
        self.cache
            .get_or_compute_default(
                REVERSE_GEOCODE_NS,
                &[KeyPart::from(at.latitude), KeyPart::from(at.longitude)],
                || {
                    self.breaker
                        .execute(REVERSE_GEOCODE_OP, || self.client.reverse_geocode(at))
                },
            )
            .await
    }

    /// Formatted address at a point, or [`UNKNOWN_LOCATION`].
    pub async fn describe_location(&self, at: Coordinates) -> GuardedResult<String> {
        Ok(self
            .reverse_geocode(at)
            .await?
            .and_then(|a| a.line1)
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()))
    }

    /// Distance from a user's home to where they are now.
    ///
    /// Cached per user and rounded current position, so repeated pings from
    /// the same spot reuse one lookup.
    pub async fn distance_from_home(
        &self,
        email: &str,
        home: Coordinates,
        current: Coordinates,
    ) -> GuardedResult<DistanceFromHome> {
        let parts = [
            KeyPart::from(email),
            KeyPart::from(current.latitude),
            KeyPart::from(current.longitude),
        ];

        let distance = self
            .cache
            .get_or_compute_default(DISTANCE_FROM_HOME_NS, &parts, || {
                self.breaker
                    .execute(DISTANCE_OP, || self.client.distance(home, current))
            })
            .await?;

        Ok(DistanceFromHome {
            email: email.to_string(),
            home_location: home,
            current_location: current,
            distance_from_home: distance,
        })
    }
}
