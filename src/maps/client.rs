//! Google Maps HTTP client.
//!
//! # Responsibilities
//! - Hold one pooled `reqwest` client with a fixed request timeout
//! - Call the Places, Geocoding and Distance Matrix endpoints
//! - Map transport, HTTP and API-level failures to [`MapsError`]
//!
//! This client is unguarded; `MapsService` wraps it in the breaker and cache.

use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::config::schema::MapsConfig;
use crate::maps::types::{
    check_status, Address, AutocompleteResponse, Coordinates, DetailsResponse, Distance,
    DistanceMatrixResponse, GeocodeResponse, MapsError, MapsResult, Prediction,
};

/// Description used when reverse geocoding finds nothing.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Thin client for the Google Maps web APIs.
#[derive(Clone)]
pub struct MapsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    places_key: String,
}

impl MapsClient {
    /// Build a client from configuration.
    pub fn new(config: &MapsConfig) -> MapsResult<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| MapsError::Http(format!("invalid base URL '{}': {}", config.base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()?;

        if config.api_key.is_empty() {
            tracing::warn!("GOOGLE_MAPS_API_KEY is not set; Maps calls will be rejected");
        }

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            places_key: config.places_key().to_string(),
        })
    }

    /// Place suggestions for free-text input.
    pub async fn autocomplete(&self, input: &str) -> MapsResult<Vec<Prediction>> {
        let resp: AutocompleteResponse = self
            .get_json(
                "place/autocomplete/json",
                &[("input", input.to_string()), ("key", self.places_key.clone())],
            )
            .await?;
        check_status(&resp.status, resp.error_message)?;
        Ok(resp.predictions)
    }

    /// Address and location for a place id.
    pub async fn place_details(&self, place_id: &str) -> MapsResult<Address> {
        let resp: DetailsResponse = self
            .get_json(
                "place/details/json",
                &[("place_id", place_id.to_string()), ("key", self.places_key.clone())],
            )
            .await?;
        check_status(&resp.status, resp.error_message)?;
        Ok(resp.result.unwrap_or_default().into_address())
    }

    /// Most relevant address at a point, or `None` if Google has nothing there.
    pub async fn reverse_geocode(&self, at: Coordinates) -> MapsResult<Option<Address>> {
        let resp: GeocodeResponse = self
            .get_json(
                "geocode/json",
                &[("latlng", at.as_param()), ("key", self.api_key.clone())],
            )
            .await?;
        check_status(&resp.status, resp.error_message)?;
        Ok(resp.results.into_iter().next().map(|r| r.into_address()))
    }

    /// Travel distance from `origin` to `destination`.
    pub async fn distance(&self, origin: Coordinates, destination: Coordinates) -> MapsResult<Distance> {
        let resp: DistanceMatrixResponse = self
            .get_json(
                "distancematrix/json",
                &[
                    ("origins", origin.as_param()),
                    ("destinations", destination.as_param()),
                    ("key", self.api_key.clone()),
                ],
            )
            .await?;
        resp.into_distance()
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> MapsResult<R> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(path, "Maps request");

        let resp = self.http.get(&url).query(params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(path, status = %status, "Maps request failed");
            return Err(MapsError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| MapsError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for MapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_base_url() {
        let config = MapsConfig {
            base_url: "::not a url".to_string(),
            ..MapsConfig::default()
        };
        assert!(matches!(MapsClient::new(&config), Err(MapsError::Http(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = MapsConfig {
            base_url: "http://127.0.0.1:9/maps/api/".to_string(),
            ..MapsConfig::default()
        };
        let client = MapsClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9/maps/api");
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = MapsConfig {
            base_url: format!("http://127.0.0.1:{}", port),
            ..MapsConfig::default()
        };
        let client = MapsClient::new(&config).unwrap();
        let err = client.autocomplete("mg road").await.unwrap_err();
        assert!(matches!(err, MapsError::Http(_)), "got {:?}", err);
    }
}
