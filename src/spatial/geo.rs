//! Great-circle geometry helpers.
//!
//! Latitude/longitude pairs are angular, so distance math happens on the
//! sphere: haversine for direct point-to-point distances, and a unit-sphere
//! (ECEF direction vector) projection for the spatial index. Chord length
//! on the unit sphere is monotonic in great-circle arc, which is what lets
//! a plain Euclidean k-d tree answer geodesic queries exactly.

use crate::geocode::Coordinate;

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two coordinates, in meters.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Project a coordinate onto the unit sphere as an ECEF direction vector.
pub fn unit_vector(c: Coordinate) -> [f64; 3] {
    let lat = c.latitude.to_radians();
    let lon = c.longitude.to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Chord length on the unit sphere subtending a great-circle arc of
/// `meters`. Arcs past the antipode clamp to the maximum chord (2.0).
pub fn chord_for_arc(meters: f64) -> f64 {
    let half_angle = (meters / (2.0 * EARTH_RADIUS_M)).min(std::f64::consts::FRAC_PI_2);
    2.0 * half_angle.sin()
}

/// Great-circle arc in meters for a unit-sphere chord length.
pub fn arc_for_chord(chord: f64) -> f64 {
    2.0 * EARTH_RADIUS_M * (chord / 2.0).clamp(0.0, 1.0).asin()
}
