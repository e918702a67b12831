//! Internal domain models for address resolution.
//!
//! These types are OUR types - they don't change when provider APIs change.
//! All provider responses get converted into these types via adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS-84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether this is a plausible WGS-84 point.
    ///
    /// Rejects non-finite values and out-of-range degrees. Used to decide
    /// whether a pre-existing coordinate on an input record can skip
    /// resolution entirely.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Which provider produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeSource {
    /// SGIS OpenAPI (token-authenticated national geocoder)
    Sgis,
    /// Kakao Local API (static REST key)
    Kakao,
    /// Coordinate was already present on the input record
    Provided,
}

/// A successfully resolved address.
///
/// Created once by the resolver on success; never mutated afterwards.
/// Absence (a `None` in batch output) is the terminal state of an
/// unresolvable address, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    /// The (trimmed) address that was resolved
    pub address: String,
    /// Resolved WGS-84 coordinate
    pub coordinate: Coordinate,
    /// Which provider answered
    pub source: GeocodeSource,
    /// When the resolution happened
    pub resolved_at: DateTime<Utc>,
}

/// One row of the input record table: an address, optionally with a
/// coordinate already attached upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    pub address: String,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

/// Errors that can occur while talking to a geocoding provider.
///
/// All of these are recovered inside the resolver (refresh-and-retry or
/// fall through to the next provider); callers only ever see them if they
/// use a provider client directly.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeocodeError {
    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("rate limited - try again later")]
    RateLimited,

    #[error("request exceeded deadline")]
    Timeout,

    #[error("no match found for address")]
    NoMatch,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(e.to_string())
        }
    }
}
