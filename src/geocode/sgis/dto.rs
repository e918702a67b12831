//! SGIS OpenAPI Data Transfer Objects
//!
//! These types match EXACTLY what the SGIS OpenAPI returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the sgis module - convert to domain types.
//!
//! API Reference: https://sgis.kostat.go.kr/developer/html/openApi/api/data.html
//!
//! The service wraps every payload in an envelope carrying `errCd`/`errMsg`;
//! HTTP status is 200 even for most application-level failures.

use serde::Deserialize;

/// Envelope wrapping every SGIS response
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Application-level status code (0 = success)
    #[serde(rename = "errCd")]
    pub err_cd: i32,
    /// Human-readable status message
    #[serde(rename = "errMsg")]
    pub err_msg: String,
    /// API identifier echoed back by the service
    #[serde(default)]
    pub id: Option<String>,
    /// Payload, absent on failure
    pub result: Option<T>,
}

/// Payload of `auth/authentication.json`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResult {
    /// Opaque access token for subsequent calls
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Token expiry as epoch milliseconds (stringified)
    #[serde(rename = "accessTimeout")]
    pub access_timeout: String,
}

/// Payload of `addr/geocodewgs84.json`
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    /// Total matches for the query (stringified)
    #[serde(default)]
    pub totalcount: Option<String>,
    /// Matches returned in this page (stringified)
    #[serde(default)]
    pub returncount: Option<String>,
    /// Matched candidates, best first; empty when nothing matched
    #[serde(default)]
    pub resultdata: Vec<GeocodeEntry>,
}

/// One geocoding candidate
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeEntry {
    /// Longitude in WGS-84 degrees (stringified)
    pub x: String,
    /// Latitude in WGS-84 degrees (stringified)
    pub y: String,
    /// Full road-name address of the match
    #[serde(default)]
    pub road_addr: Option<String>,
    /// Address kind indicator (road/parcel/building)
    #[serde(default)]
    pub addr_type: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
