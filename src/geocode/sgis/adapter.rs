//! Adapter layer: Convert SGIS DTOs to domain models
//!
//! This is the ONLY place where SGIS DTO types are converted to domain
//! types, including the mapping of the service's `errCd` codes onto the
//! shared failure taxonomy. If the API changes its response format, only
//! this file and dto.rs need to change.

use chrono::{DateTime, Utc};

use super::dto;
use crate::geocode::domain::{Coordinate, GeocodeError};

/// Application-level success.
const ERR_OK: i32 = 0;

/// Codes the service uses for missing/expired/invalid tokens.
const ERR_AUTH: &[i32] = &[-401, -402];

/// Convert an auth envelope into a token value plus its embedded expiry.
pub fn to_access_token(
    envelope: dto::Envelope<dto::AuthResult>,
) -> Result<(String, DateTime<Utc>), GeocodeError> {
    let result = check_envelope(envelope)?;

    let millis: i64 = result.access_timeout.parse().map_err(|_| {
        GeocodeError::Parse(format!(
            "accessTimeout is not epoch millis: {:?}",
            result.access_timeout
        ))
    })?;
    let expires_at = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| GeocodeError::Parse(format!("accessTimeout out of range: {millis}")))?;

    Ok((result.access_token, expires_at))
}

/// Convert a geocode envelope into a coordinate.
///
/// An empty candidate list is a well-formed "no match" answer, not a
/// malformed response.
pub fn to_coordinate(
    envelope: dto::Envelope<dto::GeocodeResult>,
) -> Result<Coordinate, GeocodeError> {
    let result = check_envelope(envelope)?;

    let Some(best) = result.resultdata.first() else {
        return Err(GeocodeError::NoMatch);
    };

    let longitude = parse_degrees(&best.x, "x")?;
    let latitude = parse_degrees(&best.y, "y")?;
    let coordinate = Coordinate::new(latitude, longitude);
    if !coordinate.is_valid() {
        return Err(GeocodeError::Parse(format!(
            "coordinate out of range: ({latitude}, {longitude})"
        )));
    }
    Ok(coordinate)
}

/// Map envelope-level failure codes and unwrap the payload.
fn check_envelope<T>(envelope: dto::Envelope<T>) -> Result<T, GeocodeError> {
    if ERR_AUTH.contains(&envelope.err_cd) {
        return Err(GeocodeError::Auth(envelope.err_msg));
    }
    if envelope.err_cd != ERR_OK {
        return Err(GeocodeError::Unavailable(format!(
            "errCd {}: {}",
            envelope.err_cd, envelope.err_msg
        )));
    }
    envelope
        .result
        .ok_or_else(|| GeocodeError::Parse("success envelope without result".to_string()))
}

fn parse_degrees(raw: &str, field: &str) -> Result<f64, GeocodeError> {
    raw.parse()
        .map_err(|_| GeocodeError::Parse(format!("{field} is not a number: {raw:?}")))
}
