//! Shared fixtures for the integration tests.
//!
//! Everything is laid out along the 11°E meridian north of a single runway
//! threshold at 60°N, so distances are easy to reason about: one degree of
//! latitude is roughly 60 NM.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use std::sync::Arc;

use amandman::adapter::{ArrivalReport, DepartureReport, FixPointReport};
use amandman::config::PlannerConfigFile;
use amandman::geo::GeoPoint;
use amandman::navdata::{Airport, ArrivalProcedure, RunwayThreshold, StarFix};
use amandman::performance::{PerformanceTable, WakeCategory};
use amandman::registration::TimelineRegistration;

pub const PERFORMANCE_CSV: &str = "\
icao_type,wake_category,initial_descent_mach,initial_descent_rod_fpm,descent_rod_fpm,approach_rod_fpm,descent_ias_kt,approach_ias_kt,landing_vat_kt
B738,M,0.78,800,3500,1500,290,210,145
A20N,M,0.78,1000,3000,1500,280,210,135
B77W,H,0.84,1000,2500,1500,300,220,150
";

/// Route fixes with their latitude, in flight order
pub const ROUTE: [(&str, f64); 3] = [("INSUV", 61.2), ("NOSLA", 60.7), ("XEMEN", 60.4)];

pub fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn performance() -> Arc<PerformanceTable> {
    Arc::new(PerformanceTable::from_csv_reader(PERFORMANCE_CSV.as_bytes()).unwrap())
}

pub fn engm() -> Airport {
    Airport {
        icao: "ENGM".to_string(),
        position: GeoPoint::new(60.2, 11.08),
        runways: vec![
            RunwayThreshold {
                id: "01L".to_string(),
                position: GeoPoint::new(60.0, 11.0),
                elevation_ft: 700.0,
                true_heading_deg: 0.0,
            },
            RunwayThreshold {
                id: "01R".to_string(),
                position: GeoPoint::new(60.0, 11.05),
                elevation_ft: 700.0,
                true_heading_deg: 0.0,
            },
        ],
        stars: vec![ArrivalProcedure {
            id: "INSU5M".to_string(),
            airport_icao: "ENGM".to_string(),
            runway: "01L".to_string(),
            fixes: vec![
                StarFix {
                    id: "NOSLA".to_string(),
                    typical_altitude_ft: Some(10_000.0),
                    typical_ias_kt: Some(250.0),
                },
                StarFix {
                    id: "XEMEN".to_string(),
                    typical_altitude_ft: Some(5_000.0),
                    typical_ias_kt: Some(220.0),
                },
            ],
        }],
    }
}

pub fn config() -> PlannerConfigFile {
    PlannerConfigFile {
        airports: vec![engm()],
        ..Default::default()
    }
}

/// Southbound arrival to ENGM at `latitude`; fixes north of it are passed
pub fn arrival(callsign: &str, latitude: f64, altitude_ft: i32) -> ArrivalReport {
    ArrivalReport {
        callsign: callsign.to_string(),
        icao_type: "B738".to_string(),
        wake_category: Some(WakeCategory::Medium),
        arrival_airport_icao: "ENGM".to_string(),
        assigned_runway: Some("01L".to_string()),
        assigned_star: None,
        assigned_direct: None,
        tracking_controller: Some("ENOS_APP".to_string()),
        latitude,
        longitude: 11.0,
        altitude_ft,
        pressure_altitude_ft: altitude_ft,
        ground_speed_kt: 300,
        track_deg: 180,
        route: ROUTE
            .iter()
            .map(|(name, fix_latitude)| FixPointReport {
                name: name.to_string(),
                latitude: *fix_latitude,
                longitude: 11.0,
                is_passed: *fix_latitude >= latitude,
            })
            .collect(),
        flight_plan_tas_kt: None,
    }
}

pub fn departure(callsign: &str, runway: Option<&str>, takeoff: Option<DateTime<Utc>>) -> DepartureReport {
    DepartureReport {
        callsign: callsign.to_string(),
        icao_type: "A20N".to_string(),
        wake_category: Some(WakeCategory::Medium),
        airport_icao: "ENGM".to_string(),
        runway: runway.map(str::to_string),
        sid: Some("OSLO4A".to_string()),
        tracking_controller: None,
        target_takeoff_time: takeoff,
    }
}

pub fn inbound_timeline(request_id: u32) -> TimelineRegistration {
    TimelineRegistration::InboundsForFix {
        request_id,
        target_fixes: vec![],
        via_fixes: vec![],
        destination_airports: vec!["ENGM".to_string()],
    }
}

pub fn outbound_timeline(request_id: u32) -> TimelineRegistration {
    TimelineRegistration::Outbounds {
        request_id,
        airport_icao: "ENGM".to_string(),
    }
}
