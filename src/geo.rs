//! Spherical Geometry
//!
//! Great-circle distance and bearing math on a spherical earth, used by the
//! directional classifier. All functions are pure and operate in degrees
//! and statute miles, matching the units shown to trail users.

use serde::{Deserialize, Serialize};

/// Earth radius in statute miles for the spherical approximation.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees (positive = north)
    pub lat: f64,
    /// Longitude in decimal degrees (positive = east)
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Position { lat, lng }
    }
}

/// Great-circle distance between two positions in miles (haversine formula).
///
/// Symmetric: `distance_miles(a, b) == distance_miles(b, a)`, and zero for
/// identical positions.
pub fn distance_miles(a: Position, b: Position) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Initial bearing from `from` to `to` in degrees, normalized to [0, 360).
///
/// 0 = north, 90 = east. Not symmetric: the bearing of the return leg
/// differs from the exact opposite except along meridians, because the
/// great circle curves relative to the meridian grid.
pub fn bearing_degrees(from: Position, to: Position) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Bearing expressed relative to the user's heading, in [0, 360).
///
/// 0 = directly ahead, 180 = directly behind. Well-defined for any finite
/// bearing/heading, including values of exactly 0 or 360.
pub fn relative_angle(bearing: f64, heading: f64) -> f64 {
    normalize_degrees(bearing - heading)
}

/// Travel time in whole minutes at the given speed, rounded to nearest.
pub fn travel_time_minutes(distance_miles: f64, speed_mph: f64) -> u32 {
    (distance_miles / speed_mph * 60.0).round() as u32
}

/// Normalize an angle to the [0, 360) range.
fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 when the input is a tiny negative number
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mid-way point on the Swamp Rabbit Trail, used across the test suite
    const TRAIL_MIDPOINT: Position = Position {
        lat: 34.8480,
        lng: -82.4049,
    };

    #[test]
    fn test_distance_symmetric() {
        let a = TRAIL_MIDPOINT;
        let b = Position::new(34.926555, -82.443180); // Furman University
        assert!((distance_miles(a, b) - distance_miles(b, a)).abs() < 1e-12);
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        assert_eq!(distance_miles(TRAIL_MIDPOINT, TRAIL_MIDPOINT), 0.0);
    }

    #[test]
    fn test_distance_known_value() {
        // One degree of latitude is about 69.1 miles on a 3959 mi sphere
        let a = Position::new(34.0, -82.0);
        let b = Position::new(35.0, -82.0);
        let d = distance_miles(a, b);
        assert!((d - 69.1).abs() < 0.2, "got {}", d);
    }

    #[test]
    fn test_bearing_due_east() {
        let poi = Position::new(34.8480, -82.3800);
        let bearing = bearing_degrees(TRAIL_MIDPOINT, poi);
        // At constant latitude the initial bearing is very close to 90
        assert!((bearing - 90.0).abs() < 1.0, "got {}", bearing);
    }

    #[test]
    fn test_bearing_due_north() {
        let a = Position::new(34.0, -82.0);
        let b = Position::new(35.0, -82.0);
        assert!((bearing_degrees(a, b) - 0.0).abs() < 1e-9);
        // Return leg along a meridian is the exact opposite
        assert!((bearing_degrees(b, a) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_in_range() {
        let points = [
            Position::new(34.863381, -82.421034),
            Position::new(34.848406, -82.404906),
            Position::new(34.926555, -82.443180),
            Position::new(34.826607, -82.378538),
        ];
        for from in points {
            for to in points {
                let b = bearing_degrees(from, to);
                assert!((0.0..360.0).contains(&b), "bearing {} out of range", b);
            }
        }
    }

    #[test]
    fn test_relative_angle_wraps() {
        assert_eq!(relative_angle(90.0, 90.0), 0.0);
        assert_eq!(relative_angle(0.0, 90.0), 270.0);
        assert_eq!(relative_angle(350.0, 10.0), 340.0);
        assert_eq!(relative_angle(10.0, 350.0), 20.0);
    }

    #[test]
    fn test_relative_angle_always_in_range() {
        for bearing in [0.0, 90.0, 180.0, 270.0, 360.0, 720.5, -45.0] {
            for heading in [0.0, 90.0, 359.999, 360.0, -360.0] {
                let r = relative_angle(bearing, heading);
                assert!((0.0..360.0).contains(&r), "relative angle {} out of range", r);
            }
        }
    }

    #[test]
    fn test_travel_time_walking() {
        // 1.5 miles at 3 mph = 30 minutes
        assert_eq!(travel_time_minutes(1.5, 3.0), 30);
        // 1 mile at 10 mph = 6 minutes
        assert_eq!(travel_time_minutes(1.0, 10.0), 6);
        // Rounds to nearest: 0.1 mi at 3 mph = 2 minutes
        assert_eq!(travel_time_minutes(0.1, 3.0), 2);
    }
}
