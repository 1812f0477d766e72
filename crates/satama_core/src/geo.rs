//! Great-circle geometry on a spherical Earth.
//!
//! All functions are pure. [`Coordinate`]s are range-checked at construction,
//! and [`distance_between`] validates raw degree pairs before measuring.

use tracing::instrument;

use crate::error::GameError;
use crate::types::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in meters.
///
/// Symmetric, and exactly zero for identical coordinates.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards asin against rounding just above 1 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_METERS * c
}

/// Haversine distance between raw `(latitude, longitude)` pairs, in meters.
///
/// # Errors
///
/// Returns [`GameError::InvalidCoordinate`] if either pair is out of range.
#[instrument]
pub fn distance_between(a: (f64, f64), b: (f64, f64)) -> Result<f64, GameError> {
    let a = Coordinate::new(a.0, a.1)?;
    let b = Coordinate::new(b.0, b.1)?;
    Ok(distance(a, b))
}

/// Initial bearing from `from` towards `to`, in degrees clockwise from north, [0, 360).
pub fn initial_bearing(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let d_lon = (to.longitude() - from.longitude()).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

/// The point reached by travelling `meters` from `origin` along `bearing_deg`.
pub fn destination(origin: Coordinate, bearing_deg: f64, meters: f64) -> Coordinate {
    let delta = meters / EARTH_RADIUS_METERS;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.latitude().to_radians();
    let lon1 = origin.longitude().to_radians();

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    let latitude = lat2.to_degrees().clamp(-90.0, 90.0);
    let longitude = normalize_degrees(lon2.to_degrees() + 180.0) - 180.0;
    Coordinate::new(latitude, longitude).unwrap_or(origin)
}

/// Eight-point compass label for a bearing in degrees.
pub fn compass_point(bearing_deg: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let sector = ((normalize_degrees(bearing_deg) + 22.5) / 45.0) as usize % 8;
    POINTS[sector]
}

fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d >= 360.0 { 0.0 } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        for p in [c(60.1699, 24.9384), c(-33.9, 151.2), c(90.0, 0.0), c(0.0, -180.0)] {
            assert_eq!(distance(p, p), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (c(60.1699, 24.9384), c(60.4518, 22.2666)),
            (c(65.0121, 25.4651), c(-12.0, 77.0)),
            (c(0.0, 179.9), c(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance(a, b), distance(b, a));
        }
    }

    #[test]
    fn helsinki_to_turku() {
        let d = distance(c(60.1699, 24.9384), c(60.4518, 22.2666));
        assert!((d - 150_000.0).abs() < 5_000.0, "Expected ~150km, got {d}m");
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = distance(c(0.0, 0.0), c(0.0, 180.0));
        let half = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((d - half).abs() < 1.0);
    }

    #[test]
    fn raw_pairs_are_validated() {
        assert!(distance_between((60.0, 25.0), (60.0, 25.0)).is_ok());
        assert!(matches!(
            distance_between((91.0, 25.0), (60.0, 25.0)),
            Err(GameError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = c(60.0, 25.0);
        assert!(initial_bearing(origin, c(61.0, 25.0)).abs() < 1e-9);
        let east = initial_bearing(origin, c(60.0, 26.0));
        assert!((east - 90.0).abs() < 1.0, "got {east}");
        assert_eq!(compass_point(initial_bearing(origin, c(59.0, 25.0))), "S");
    }

    #[test]
    fn compass_wraps_near_north() {
        assert_eq!(compass_point(359.0), "N");
        assert_eq!(compass_point(-10.0), "N");
        assert_eq!(compass_point(45.0), "NE");
        assert_eq!(compass_point(292.0), "W");
    }

    #[test]
    fn destination_travels_requested_distance() {
        let origin = c(60.1699, 24.9384);
        let target = destination(origin, 135.0, 25_000.0);
        assert!((distance(origin, target) - 25_000.0).abs() < 1.0);
        let bearing = initial_bearing(origin, target);
        assert!((bearing - 135.0).abs() < 0.5, "got {bearing}");
    }
}
