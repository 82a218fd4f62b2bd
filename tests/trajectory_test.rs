mod common;

use chrono::Duration;
use std::collections::HashMap;

use amandman::errors::TrajectoryError;
use amandman::geo::GeoPoint;
use amandman::navdata::Airport;
use amandman::planner::estimate_arrival;
use amandman::timeline::NonSequencedReason;
use amandman::weather::{VerticalWeatherProfile, WeatherLayer, WindVector};

use common::{arrival, engm, performance, t0};

fn airports() -> HashMap<String, Airport> {
    HashMap::from([("ENGM".to_string(), engm())])
}

fn southerly_wind(speed_kt: f64) -> Vec<VerticalWeatherProfile> {
    vec![VerticalWeatherProfile {
        time: t0(),
        position: GeoPoint::new(60.5, 11.0),
        layers: vec![
            WeatherLayer {
                flight_level_ft: 2_000,
                temperature_c: 8.0,
                wind: WindVector::new(180.0, speed_kt),
            },
            WeatherLayer {
                flight_level_ft: 24_000,
                temperature_c: -33.0,
                wind: WindVector::new(180.0, speed_kt),
            },
        ],
    }]
}

#[test]
fn test_closer_aircraft_arrives_first() {
    let performance = performance();
    let airports = airports();

    let estimate = |report| {
        estimate_arrival(&airports, performance.as_ref(), &[], &report, t0())
            .result
            .unwrap()
    };
    let near = estimate(arrival("NEAR1", 61.0, 12_000));
    let far = estimate(arrival("FAR1", 61.5, 20_000));
    assert!(near.estimated_time < far.estimated_time);
    assert!(near.remaining_distance_nm < far.remaining_distance_nm);
    assert!(near.estimated_time > t0());

    // Trajectory ends at the runway threshold, with the passed fix left out
    let ids: Vec<&str> = near.trajectory.iter().map(|s| s.fix_id.as_str()).collect();
    assert_eq!(ids, vec!["NOSLA", "XEMEN", "01L"]);
}

#[test]
fn test_headwind_delays_arrival() {
    let performance = performance();
    let airports = airports();
    let report = arrival("SAS1", 61.0, 12_000);

    let calm = estimate_arrival(&airports, performance.as_ref(), &[], &report, t0())
        .result
        .unwrap();
    // Wind from the south is a headwind for a southbound aircraft
    let weather = southerly_wind(50.0);
    let headwind = estimate_arrival(&airports, performance.as_ref(), &weather, &report, t0())
        .result
        .unwrap();

    assert!(headwind.estimated_time > calm.estimated_time);
    assert!(headwind.estimated_time - calm.estimated_time > Duration::seconds(60));
}

#[test]
fn test_star_constraints_are_flown() {
    let performance = performance();
    let airports = airports();
    let mut report = arrival("SAS2", 61.0, 12_000);
    report.assigned_star = Some("INSU5M".to_string());

    let estimate = estimate_arrival(&airports, performance.as_ref(), &[], &report, t0());
    assert!(estimate.navdata_derived);
    let trajectory = estimate.result.unwrap().trajectory;

    assert_eq!(trajectory[0].fix_id, "NOSLA");
    assert_eq!(trajectory[0].target_altitude_ft, 10_000);
    assert_eq!(trajectory[0].ias_kt, 250);
    assert_eq!(trajectory[1].target_altitude_ft, 5_000);
}

#[test]
fn test_unknown_star_is_not_navdata_derived() {
    let performance = performance();
    let airports = airports();
    let mut report = arrival("SAS3", 61.0, 12_000);
    report.assigned_star = Some("NONE1A".to_string());

    let estimate = estimate_arrival(&airports, performance.as_ref(), &[], &report, t0());
    assert!(!estimate.navdata_derived);
    assert!(estimate.result.is_ok());
}

#[test]
fn test_failure_reasons() {
    let performance = performance();
    let airports = airports();

    let mut unknown_type = arrival("TYPE1", 61.0, 12_000);
    unknown_type.icao_type = "ZZZZ".to_string();
    let mut no_runway = arrival("NORWY", 61.0, 12_000);
    no_runway.assigned_runway = None;
    let mut no_route = arrival("NORTE", 61.0, 12_000);
    no_route.route.clear();
    let too_high = arrival("HIGH1", 60.5, 25_000);

    let reason = |report| {
        estimate_arrival(&airports, performance.as_ref(), &[], &report, t0())
            .result
            .unwrap_err()
            .non_sequenced_reason()
    };
    assert_eq!(reason(unknown_type), NonSequencedReason::MissingPerformanceData);
    assert_eq!(reason(no_runway), NonSequencedReason::NoAssignedRunway);
    assert_eq!(reason(no_route), NonSequencedReason::EmptyRoute);
    assert_eq!(reason(too_high), NonSequencedReason::ExcessAltitude);
}

#[test]
fn test_too_high_keeps_best_effort_trajectory() {
    let performance = performance();
    let airports = airports();

    let report = arrival("HIGH2", 60.5, 25_000);
    match estimate_arrival(&airports, performance.as_ref(), &[], &report, t0()).result {
        Err(error @ TrajectoryError::ReachedEndOfRoute { .. }) => {
            let best_effort = error.best_effort_trajectory().unwrap();
            assert_eq!(best_effort.last().unwrap().fix_id, "01L");
            assert!(best_effort.last().unwrap().altitude_ft > 750);
        }
        other => panic!("expected ReachedEndOfRoute, got {other:?}"),
    }
}

#[test]
fn test_unknown_airport_and_runway() {
    let performance = performance();
    let airports = airports();

    let mut elsewhere = arrival("SAS4", 61.0, 12_000);
    elsewhere.arrival_airport_icao = "ENBR".to_string();
    let result = estimate_arrival(&airports, performance.as_ref(), &[], &elsewhere, t0()).result;
    assert_eq!(
        result.unwrap_err().non_sequenced_reason(),
        NonSequencedReason::UnknownError
    );

    let mut bad_runway = arrival("SAS5", 61.0, 12_000);
    bad_runway.assigned_runway = Some("19R".to_string());
    let estimate = estimate_arrival(&airports, performance.as_ref(), &[], &bad_runway, t0());
    assert_eq!(estimate.runway.as_deref(), Some("19R"));
    assert!(matches!(estimate.result, Err(TrajectoryError::Other(_))));
}
