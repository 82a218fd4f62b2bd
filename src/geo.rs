//! Great-circle primitives for positions along an arrival route.
//!
//! All distances are in nautical miles and all bearings in degrees true.

use serde::{Deserialize, Serialize};

/// Earth radius in nautical miles
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// A geographic position (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another point in nautical miles (Haversine)
    pub fn distance_nm(&self, other: &GeoPoint) -> f64 {
        haversine_distance_nm(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    /// Initial great-circle bearing to another point, 0..360 degrees true
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let y = delta_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

        normalize_degrees(y.atan2(x).to_degrees())
    }

    /// Point reached after flying `distance_nm` along the great circle towards `target`.
    ///
    /// Distances at or beyond the target return the target itself.
    pub fn move_towards(&self, target: &GeoPoint, distance_nm: f64) -> GeoPoint {
        let total = self.distance_nm(target);
        if distance_nm <= 0.0 || total <= f64::EPSILON {
            return *self;
        }
        if distance_nm >= total {
            return *target;
        }
        self.destination(self.bearing_to(target), distance_nm)
    }

    /// Destination point given an initial bearing and a distance
    pub fn destination(&self, bearing_deg: f64, distance_nm: f64) -> GeoPoint {
        let delta = distance_nm / EARTH_RADIUS_NM;
        let theta = bearing_deg.to_radians();
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint {
            latitude: lat2.to_degrees(),
            longitude: ((lon2.to_degrees() + 540.0) % 360.0) - 180.0,
        }
    }

    /// Midpoint of the great circle between two points
    pub fn midpoint(&self, other: &GeoPoint) -> GeoPoint {
        self.move_towards(other, self.distance_nm(other) / 2.0)
    }
}

/// Calculate distance between two points in nautical miles using the Haversine formula
pub fn haversine_distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_NM * c
}

/// Calculate the angular difference between two headings in degrees
/// Returns the smallest angle between the two headings (0-180 degrees)
pub fn angular_difference(angle1: f64, angle2: f64) -> f64 {
    let diff = (angle1 - angle2).abs() % 360.0;
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Wrap any angle into 0..360
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}
