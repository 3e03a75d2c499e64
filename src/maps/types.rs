//! Maps types, Google response shapes and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `lat,lng` as Google expects in query parameters.
    pub fn as_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub description: String,
    pub place_id: String,
}

/// Postal address flattened from a geocoding or place-details result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Travel distance and time between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub meters: u64,
    pub text: String,
    pub duration_secs: u64,
    pub duration_text: String,
}

/// How far a user currently is from home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceFromHome {
    pub email: String,
    pub home_location: Coordinates,
    pub current_location: Coordinates,
    pub distance_from_home: Distance,
}

/// Errors from a Maps API call.
#[derive(Debug, Clone, Error)]
pub enum MapsError {
    /// The request exceeded the client timeout.
    #[error("Maps request timed out")]
    Timeout,

    /// Transport failure (connect, TLS, body read).
    #[error("Maps HTTP error: {0}")]
    Http(String),

    /// Non-2xx response.
    #[error("Maps returned HTTP {0}")]
    Status(u16),

    /// Google reported a request-level failure.
    #[error("Maps API status {status}: {message}")]
    Api { status: String, message: String },

    /// The body did not have the expected shape.
    #[error("Maps response decode error: {0}")]
    Decode(String),

    /// A distance matrix element could not be routed.
    #[error("Maps distance element status {0}")]
    Element(String),
}

impl From<reqwest::Error> for MapsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MapsError::Timeout
        } else {
            // The URL carries the API key.
            MapsError::Http(err.without_url().to_string())
        }
    }
}

/// Result type for Maps client calls.
pub type MapsResult<T> = Result<T, MapsError>;

pub(crate) fn check_status(status: &str, error_message: Option<String>) -> MapsResult<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(MapsError::Api {
            status: other.to_string(),
            message: error_message.unwrap_or_default(),
        }),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AutocompleteResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    pub error_message: Option<String>,
    pub result: Option<PlaceResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlaceResult {
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl PlaceResult {
    fn component(&self, kind: &str) -> Option<String> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
            .map(|c| c.long_name.clone())
    }

    /// Flatten into an [`Address`]. State is the most general administrative
    /// area present, checking levels 1 through 5 in order.
    pub fn into_address(self) -> Address {
        let city = self.component("locality");
        let state = (1..=5).find_map(|level| {
            self.component(&format!("administrative_area_level_{}", level))
        });
        let pincode = self.component("postal_code");
        let location = self.geometry.and_then(|g| g.location);

        Address {
            line1: self.formatted_address,
            line2: String::new(),
            city,
            state,
            pincode,
            latitude: location.as_ref().map(|l| l.lat),
            longitude: location.as_ref().map(|l| l.lng),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DistanceMatrixResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub rows: Vec<DistanceRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DistanceRow {
    #[serde(default)]
    pub elements: Vec<DistanceElement>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DistanceElement {
    pub status: String,
    pub distance: Option<TextValue>,
    pub duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextValue {
    pub text: String,
    pub value: u64,
}

impl DistanceMatrixResponse {
    /// The single origin/destination element as a [`Distance`].
    pub fn into_distance(self) -> MapsResult<Distance> {
        check_status(&self.status, self.error_message)?;

        let element = self
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or_else(|| MapsError::Decode("distance matrix has no elements".to_string()))?;

        if element.status != "OK" {
            return Err(MapsError::Element(element.status));
        }

        match (element.distance, element.duration) {
            (Some(distance), Some(duration)) => Ok(Distance {
                meters: distance.value,
                text: distance.text,
                duration_secs: duration.value,
                duration_text: duration.text,
            }),
            _ => Err(MapsError::Decode(
                "distance element missing distance or duration".to_string(),
            )),
        }
    }
}
