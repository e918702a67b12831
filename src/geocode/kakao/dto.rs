//! Kakao Local API Data Transfer Objects
//!
//! These types match EXACTLY what the Kakao address search API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the kakao module - convert to domain types.
//!
//! API Reference: https://developers.kakao.com/docs/latest/ko/local/dev-guide
//!
//! Coordinates come back as stringified decimals with `x` = longitude and
//! `y` = latitude (the service's convention, easy to get backwards).

use serde::Deserialize;

/// Response of `/v2/local/search/address.json`
#[derive(Debug, Clone, Deserialize)]
pub struct AddressSearchResponse {
    /// Result page metadata
    pub meta: Meta,
    /// Matched documents, best first; empty when nothing matched
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// Paging metadata
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    /// Total matches for the query
    pub total_count: u32,
    /// Whether this is the last page
    #[serde(default)]
    pub is_end: bool,
}

/// One matched address
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// Full matched address string
    pub address_name: String,
    /// Longitude in WGS-84 degrees (stringified)
    pub x: String,
    /// Latitude in WGS-84 degrees (stringified)
    pub y: String,
    /// Match kind: REGION, ROAD, REGION_ADDR, ROAD_ADDR
    #[serde(default)]
    pub address_type: Option<String>,
}

/// Error payload returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub msg: String,
    pub code: i32,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
