//! Wind and temperature interpolation over vertical weather profiles.
//!
//! Profiles are snapshots fetched by an outside collaborator. Nothing here
//! blocks or fails: missing data yields `None` and the caller falls back to
//! calm wind and standard temperature.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, normalize_degrees};

/// Horizontal distance under which a profile is considered to be at the query point
const COLOCATED_NM: f64 = 0.01;

/// Wind as reported: the direction the wind blows from, and its speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindVector {
    pub direction_deg: f64,
    pub speed_kt: f64,
}

impl WindVector {
    pub fn new(direction_deg: f64, speed_kt: f64) -> Self {
        Self {
            direction_deg,
            speed_kt,
        }
    }

    pub fn calm() -> Self {
        Self::new(0.0, 0.0)
    }

    /// (north, east) components of the from-vector
    fn components(&self) -> (f64, f64) {
        let rad = self.direction_deg.to_radians();
        (self.speed_kt * rad.cos(), self.speed_kt * rad.sin())
    }

    fn from_components(north: f64, east: f64) -> Self {
        let speed_kt = (north * north + east * east).sqrt();
        if speed_kt < 1e-9 {
            return Self::calm();
        }
        Self::new(normalize_degrees(east.atan2(north).to_degrees()), speed_kt)
    }
}

/// One flight-level sample of a vertical profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherLayer {
    pub flight_level_ft: i32,
    pub temperature_c: f64,
    pub wind: WindVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalWeatherProfile {
    pub time: DateTime<Utc>,
    pub position: GeoPoint,
    pub layers: Vec<WeatherLayer>,
}

/// Interpolated conditions at a point in space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSample {
    pub wind: WindVector,
    pub temperature_c: f64,
}

impl VerticalWeatherProfile {
    /// Linear interpolation between the two layers bracketing `altitude_ft`.
    ///
    /// Altitudes outside the sampled range clamp to the nearest layer. Returns
    /// `None` only when the profile has no layers.
    pub fn interpolate_at(&self, altitude_ft: f64) -> Option<WeatherSample> {
        let mut sorted: Vec<&WeatherLayer> = self.layers.iter().collect();
        sorted.sort_by_key(|layer| layer.flight_level_ft);

        let lowest = *sorted.first()?;
        let highest = *sorted.last()?;

        let lower = sorted
            .iter()
            .rev()
            .find(|layer| f64::from(layer.flight_level_ft) <= altitude_ft)
            .copied()
            .unwrap_or(lowest);
        let upper = sorted
            .iter()
            .find(|layer| f64::from(layer.flight_level_ft) > altitude_ft)
            .copied()
            .unwrap_or(highest);

        let lower_ft = f64::from(lower.flight_level_ft);
        let upper_ft = f64::from(upper.flight_level_ft);
        let ratio = if altitude_ft <= lower_ft || upper_ft <= lower_ft {
            0.0
        } else if altitude_ft >= upper_ft {
            1.0
        } else {
            (altitude_ft - lower_ft) / (upper_ft - lower_ft)
        };

        let (n1, e1) = lower.wind.components();
        let (n2, e2) = upper.wind.components();

        Some(WeatherSample {
            wind: WindVector::from_components(
                n1 + ratio * (n2 - n1),
                e1 + ratio * (e2 - e1),
            ),
            temperature_c: lower.temperature_c + ratio * (upper.temperature_c - lower.temperature_c),
        })
    }
}

/// Wind and temperature at `position` and `altitude_ft` from all available profiles.
///
/// Profiles are combined by inverse-distance weighting of their wind
/// components and temperatures. A profile located at the query point is used
/// on its own.
pub fn wind_at(
    position: &GeoPoint,
    altitude_ft: f64,
    profiles: &[VerticalWeatherProfile],
) -> Option<WeatherSample> {
    let mut samples = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let Some(sample) = profile.interpolate_at(altitude_ft) else {
            continue;
        };
        let distance = position.distance_nm(&profile.position);
        if distance < COLOCATED_NM {
            return Some(sample);
        }
        samples.push((distance, sample));
    }

    match samples.as_slice() {
        [] => None,
        [(_, only)] => Some(*only),
        _ => {
            let mut weight_sum = 0.0;
            let mut north = 0.0;
            let mut east = 0.0;
            let mut temperature = 0.0;
            for (distance, sample) in &samples {
                let weight = 1.0 / (distance * distance);
                let (n, e) = sample.wind.components();
                weight_sum += weight;
                north += weight * n;
                east += weight * e;
                temperature += weight * sample.temperature_c;
            }
            Some(WeatherSample {
                wind: WindVector::from_components(north / weight_sum, east / weight_sum),
                temperature_c: temperature / weight_sum,
            })
        }
    }
}
