//! Adapter layer: Convert Kakao DTOs to domain models
//!
//! The ONLY place where Kakao DTO types become domain types. Remember the
//! service's axis convention: `x` is longitude, `y` is latitude.

use super::dto;
use crate::geocode::domain::{Coordinate, GeocodeError};

/// Pick the best candidate and convert it to a coordinate.
pub fn to_coordinate(response: dto::AddressSearchResponse) -> Result<Coordinate, GeocodeError> {
    let Some(best) = response.documents.first() else {
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

fn parse_degrees(raw: &str, field: &str) -> Result<f64, GeocodeError> {
    raw.parse()
        .map_err(|_| GeocodeError::Parse(format!("{field} is not a number: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(documents: Vec<dto::Document>) -> dto::AddressSearchResponse {
        dto::AddressSearchResponse {
            meta: dto::Meta {
                total_count: documents.len() as u32,
                is_end: true,
            },
            documents,
        }
    }

    fn document(x: &str, y: &str) -> dto::Document {
        dto::Document {
            address_name: "서울 중구 세종대로 110".to_string(),
            x: x.to_string(),
            y: y.to_string(),
            address_type: Some("ROAD_ADDR".to_string()),
        }
    }

    #[test]
    fn test_axis_convention() {
        let coord = to_coordinate(response(vec![document("126.977945", "37.566317")])).unwrap();
        // x is longitude, y is latitude.
        assert!((coord.longitude - 126.977945).abs() < 1e-9);
        assert!((coord.latitude - 37.566317).abs() < 1e-9);
    }

    #[test]
    fn test_empty_documents_is_no_match() {
        assert!(matches!(
            to_coordinate(response(vec![])),
            Err(GeocodeError::NoMatch)
        ));
    }

    #[test]
    fn test_garbled_coordinate_is_parse_error() {
        assert!(matches!(
            to_coordinate(response(vec![document("east-ish", "37.5")])),
            Err(GeocodeError::Parse(_))
        ));
    }
}
