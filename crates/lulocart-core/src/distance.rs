//! # Distance Module
//!
//! Great-circle distance between geographic coordinates via the Haversine
//! formula. Used to price delivery and to enforce the service-area limit.
//!
//! No error conditions: the distance is always a non-negative real number,
//! and identical points return 0.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Coordinate
// =============================================================================

/// A geographic coordinate in decimal degrees.
///
/// Produced by the geocoding collaborator; consumed by [`haversine_km`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coordinate {
    /// Latitude in decimal degrees, north positive.
    pub lat: f64,
    /// Longitude in decimal degrees, east positive.
    pub lng: f64,
}

impl Coordinate {
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Coordinate { lat, lng }
    }
}

// =============================================================================
// Haversine
// =============================================================================

/// Returns the great-circle distance between two coordinates in kilometers.
///
/// ## Example
/// ```rust
/// use lulocart_core::distance::{haversine_km, Coordinate};
///
/// let store = Coordinate::new(49.2827, -123.1207);   // Vancouver
/// let customer = Coordinate::new(49.2488, -122.9805); // Burnaby
///
/// let km = haversine_km(store, customer);
/// assert!(km > 10.0 && km < 12.0);
/// ```
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    // atan2 form is numerically stable near antipodal points
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points_are_zero() {
        let p = Coordinate::new(49.2827, -123.1207);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_known_distance_vancouver_toronto() {
        let vancouver = Coordinate::new(49.2827, -123.1207);
        let toronto = Coordinate::new(43.6532, -79.3832);

        let km = haversine_km(vancouver, toronto);
        // Great-circle distance is ~3359 km; allow a loose tolerance
        assert!((km - 3359.0).abs() < 15.0, "got {km}");
    }

    #[test]
    fn test_small_distance_at_equator() {
        // 0.01 degrees of latitude ≈ 1.112 km
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.01, 0.0);

        let km = haversine_km(a, b);
        assert!((km - 1.112).abs() < 0.01, "got {km}");
    }

    #[test]
    fn test_symmetric() {
        let a = Coordinate::new(49.2827, -123.1207);
        let b = Coordinate::new(49.1666, -123.1336);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_always_non_negative() {
        let a = Coordinate::new(-33.8688, 151.2093);
        let b = Coordinate::new(40.7128, -74.0060);
        assert!(haversine_km(a, b) >= 0.0);
    }
}
