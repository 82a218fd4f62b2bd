//! Reference navigation data: runway thresholds and published arrival procedures.
//!
//! Loaded once per airport from the planner configuration and shared read-only
//! between computations.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayThreshold {
    /// Runway designator, e.g. "01L"
    pub id: String,
    pub position: GeoPoint,
    #[serde(default)]
    pub elevation_ft: f64,
    pub true_heading_deg: f64,
}

/// A fix of an arrival procedure with the altitude and speed normally flown there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarFix {
    pub id: String,
    #[serde(default)]
    pub typical_altitude_ft: Option<f64>,
    #[serde(default)]
    pub typical_ias_kt: Option<f64>,
}

/// Standard arrival route for one runway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalProcedure {
    pub id: String,
    pub airport_icao: String,
    pub runway: String,
    pub fixes: Vec<StarFix>,
}

impl ArrivalProcedure {
    pub fn fix(&self, id: &str) -> Option<&StarFix> {
        self.fixes.iter().find(|fix| fix.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fix(id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub icao: String,
    pub position: GeoPoint,
    #[serde(default)]
    pub runways: Vec<RunwayThreshold>,
    #[serde(default)]
    pub stars: Vec<ArrivalProcedure>,
}

impl Airport {
    pub fn runway(&self, id: &str) -> Option<&RunwayThreshold> {
        self.runways.iter().find(|runway| runway.id == id)
    }

    /// Arrival procedure by name, preferring the variant published for `runway`
    pub fn star(&self, id: &str, runway: Option<&str>) -> Option<&ArrivalProcedure> {
        let mut candidates = self.stars.iter().filter(|star| star.id == id);
        match runway {
            Some(runway) => {
                let all: Vec<&ArrivalProcedure> = candidates.collect();
                all.iter()
                    .find(|star| star.runway == runway)
                    .or_else(|| all.first())
                    .copied()
            }
            None => candidates.next(),
        }
    }
}
