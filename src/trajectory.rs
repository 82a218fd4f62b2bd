//! Descent trajectory estimation.
//!
//! The aircraft is flown forward from its current state through every
//! upcoming route point to the runway threshold in fixed time steps. Each
//! step picks an IAS from the arrival procedure or the performance schedule,
//! converts it to TAS for the local temperature, applies the local wind for
//! ground speed and descends at the performance rate towards the leg's target
//! altitude.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::airspeed::{ground_speed, ias_to_tas, standard_temperature_c, tas_to_ias};
use crate::errors::TrajectoryError;
use crate::geo::{GeoPoint, angular_difference};
use crate::navdata::{ArrivalProcedure, RunwayThreshold};
use crate::performance::{AircraftPerformance, PerformanceLookup, WakeCategory};
use crate::route::{RemainingRoute, RoutePoint, speed_expectation};
use crate::weather::{VerticalWeatherProfile, WindVector, wind_at};

/// Simulation step in seconds
const STEP_SECONDS: f64 = 10.0;
/// Maximum IAS change in knots per second
const SPEED_CHANGE_RATE_KT_PER_SEC: f64 = 0.5;
/// Feet lost per nautical mile on a 3° approach path
const GLIDE_PATH_FT_PER_NM: f64 = 318.4;
/// Allowed excess above threshold elevation when the trajectory ends
const THRESHOLD_ALTITUDE_TOLERANCE_FT: f64 = 50.0;
/// Floor on ground speed so strong headwinds cannot stall the simulation
const MIN_GROUND_SPEED_KT: f64 = 30.0;
/// Upper bound on steps per leg
const MAX_STEPS_PER_LEG: usize = 20_000;

/// Live state of an aircraft as last reported
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    pub position: GeoPoint,
    pub altitude_ft: f64,
    pub ground_speed_kt: f64,
    pub track_deg: f64,
}

/// One simulated sample along the descent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescentStep {
    pub position: GeoPoint,
    pub altitude_ft: f64,
    pub ground_speed_kt: f64,
    pub tas_kt: f64,
    pub ias_kt: f64,
    pub wind: WindVector,
    /// Seconds since the start of the simulation
    pub elapsed_sec: f64,
}

/// The leg flown inbound to one route point.
///
/// Remaining distance and time are measured from the start of the leg to the
/// threshold, so the first segment holds the totals for the whole descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescentSegment {
    pub fix_id: String,
    pub position: GeoPoint,
    /// Planned crossing altitude for the fix
    pub target_altitude_ft: i32,
    /// Simulated crossing altitude
    pub altitude_ft: i32,
    pub remaining_distance_nm: f64,
    pub remaining_time_sec: i64,
    /// Average ground speed over the leg
    pub ground_speed_kt: i32,
    pub tas_kt: i32,
    pub ias_kt: i32,
}

/// Everything needed to estimate one aircraft's descent
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryInput<'a> {
    pub callsign: &'a str,
    pub aircraft_type: &'a str,
    pub state: &'a AircraftState,
    pub route: &'a RemainingRoute,
    pub runway: &'a RunwayThreshold,
    pub star: Option<&'a ArrivalProcedure>,
    pub weather: &'a [VerticalWeatherProfile],
    pub flight_plan_tas: Option<f64>,
}

/// Full simulation output
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedDescent {
    pub segments: Vec<DescentSegment>,
    pub steps: Vec<DescentStep>,
}

/// Result of a successful estimate for one aircraft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedArrival {
    pub trajectory: Vec<DescentSegment>,
    /// Threshold crossing time
    pub estimated_time: DateTime<Utc>,
    pub remaining_distance_nm: f64,
    pub landing_ias_kt: f64,
    pub wake_category: WakeCategory,
}

/// Truncate a timestamp to whole seconds
pub fn whole_seconds(time: DateTime<Utc>) -> DateTime<Utc> {
    time.trunc_subsecs(0)
}

/// Leg to simulate: the point flown towards and the constraints applied on the way
struct Leg<'a> {
    fix_id: &'a str,
    position: GeoPoint,
    target_altitude_ft: f64,
    target_ias_kt: Option<f64>,
}

/// Mutable state of the simulated aircraft
struct Probe {
    position: GeoPoint,
    altitude_ft: f64,
    ias_kt: f64,
    elapsed_sec: f64,
}

pub struct DescentTrajectoryBuilder<'a> {
    performance: &'a dyn PerformanceLookup,
}

impl<'a> DescentTrajectoryBuilder<'a> {
    pub fn new(performance: &'a dyn PerformanceLookup) -> Self {
        Self { performance }
    }

    /// Estimate the threshold crossing for one aircraft
    ///
    /// # Arguments
    /// * `input` - Aircraft state, route, runway and weather
    /// * `now` - Time of the aircraft state, truncated to whole seconds
    ///
    /// # Returns
    /// The trajectory with its threshold crossing time, or the reason no
    /// estimate could be made
    pub fn estimate(
        &self,
        input: &TrajectoryInput<'_>,
        now: DateTime<Utc>,
    ) -> Result<EstimatedArrival, TrajectoryError> {
        let performance = self.lookup(input)?;
        let trajectory = self.build_trajectory(input)?;
        let first = trajectory.first().ok_or_else(|| {
            TrajectoryError::EmptyTrajectory(format!("no segments for {}", input.callsign))
        })?;

        Ok(EstimatedArrival {
            estimated_time: whole_seconds(now) + Duration::seconds(first.remaining_time_sec),
            remaining_distance_nm: first.remaining_distance_nm,
            landing_ias_kt: performance.landing_vat_kt,
            wake_category: performance.wake_category,
            trajectory,
        })
    }

    /// Ordered descent segments from the current position to the threshold
    pub fn build_trajectory(
        &self,
        input: &TrajectoryInput<'_>,
    ) -> Result<Vec<DescentSegment>, TrajectoryError> {
        self.simulate(input).map(|descent| descent.segments)
    }

    /// Run the step simulation and keep every step
    pub fn simulate(&self, input: &TrajectoryInput<'_>) -> Result<SimulatedDescent, TrajectoryError> {
        let performance = self.lookup(input)?;

        let upcoming = input.route.upcoming();
        if upcoming.is_empty() {
            return Err(TrajectoryError::EmptyTrajectory(format!(
                "{} has no remaining route points",
                input.callsign
            )));
        }

        let state = input.state;

        let legs = plan_legs(input, upcoming);

        let mut probe = Probe {
            position: state.position,
            altitude_ft: state.altitude_ft,
            ias_kt: initial_ias(input, performance),
            elapsed_sec: 0.0,
        };

        let mut steps = Vec::new();
        // (leg distance, leg duration) for each leg in flight order
        let mut leg_totals = Vec::with_capacity(legs.len());
        let mut crossings = Vec::with_capacity(legs.len());

        for leg in &legs {
            let start_elapsed = probe.elapsed_sec;
            let distance = probe.position.distance_nm(&leg.position);
            self.fly_leg(input, performance, leg, &mut probe, &mut steps);
            leg_totals.push((distance, probe.elapsed_sec - start_elapsed));
            crossings.push((
                probe.altitude_ft,
                ias_to_tas(probe.ias_kt, probe.altitude_ft, temperature_at(input, &probe)),
                probe.ias_kt,
            ));
        }

        let segments = assemble_segments(&legs, &leg_totals, &crossings);

        let threshold_ft = input.runway.elevation_ft;
        if probe.altitude_ft > threshold_ft + THRESHOLD_ALTITUDE_TOLERANCE_FT {
            let excess = probe.altitude_ft - threshold_ft;
            debug!(
                "{} reaches runway {} {:.0} ft above threshold",
                input.callsign, input.runway.id, excess
            );
            return Err(TrajectoryError::ReachedEndOfRoute {
                message: format!(
                    "{} reaches runway {} {:.0} ft above threshold",
                    input.callsign, input.runway.id, excess
                ),
                best_effort: segments,
            });
        }

        Ok(SimulatedDescent { segments, steps })
    }

    fn lookup(&self, input: &TrajectoryInput<'_>) -> Result<&'a AircraftPerformance, TrajectoryError> {
        let table: &'a dyn PerformanceLookup = self.performance;
        table
            .performance(input.aircraft_type)
            .ok_or_else(|| {
                TrajectoryError::UnknownAircraftType(format!(
                    "no performance data for {} ({})",
                    input.aircraft_type, input.callsign
                ))
            })
    }

    fn fly_leg(
        &self,
        input: &TrajectoryInput<'_>,
        performance: &AircraftPerformance,
        leg: &Leg<'_>,
        probe: &mut Probe,
        steps: &mut Vec<DescentStep>,
    ) {
        for _ in 0..MAX_STEPS_PER_LEG {
            let remaining_nm = probe.position.distance_nm(&leg.position);
            if remaining_nm < 1e-6 {
                break;
            }

            // Weather is sampled halfway along the step about to be flown
            let still_air_tas = ias_to_tas(
                probe.ias_kt,
                probe.altitude_ft,
                standard_temperature_c(probe.altitude_ft),
            );
            let lookahead_nm = (still_air_tas * STEP_SECONDS / 3600.0).min(remaining_nm);
            let step_end = probe.position.move_towards(&leg.position, lookahead_nm);
            let sample_at = probe.position.midpoint(&step_end);
            let weather = wind_at(&sample_at, probe.altitude_ft, input.weather);
            let temperature = weather
                .map(|sample| sample.temperature_c)
                .unwrap_or_else(|| standard_temperature_c(probe.altitude_ft));
            let wind = weather
                .map(|sample| sample.wind)
                .unwrap_or_else(WindVector::calm);

            let target_ias = leg.target_ias_kt.unwrap_or_else(|| {
                performance.preferred_ias(probe.altitude_ft, Some(temperature), input.flight_plan_tas)
            });
            let max_change = SPEED_CHANGE_RATE_KT_PER_SEC * STEP_SECONDS;
            probe.ias_kt += (target_ias - probe.ias_kt).clamp(-max_change, max_change);

            let tas = ias_to_tas(probe.ias_kt, probe.altitude_ft, temperature);
            let track = probe.position.bearing_to(&leg.position);
            let gs = ground_speed(tas, &wind, track).max(MIN_GROUND_SPEED_KT);

            let step_nm = gs * STEP_SECONDS / 3600.0;
            let dt = if step_nm >= remaining_nm {
                probe.position = leg.position;
                remaining_nm / gs * 3600.0
            } else {
                probe.position = probe.position.move_towards(&leg.position, step_nm);
                STEP_SECONDS
            };

            if probe.altitude_ft > leg.target_altitude_ft {
                let vertical_speed = performance.descent_rate_fpm(probe.altitude_ft) / 60.0;
                probe.altitude_ft = (probe.altitude_ft - vertical_speed * dt).max(leg.target_altitude_ft);
            }
            probe.elapsed_sec += dt;

            steps.push(DescentStep {
                position: probe.position,
                altitude_ft: probe.altitude_ft,
                ground_speed_kt: gs,
                tas_kt: tas,
                ias_kt: probe.ias_kt,
                wind,
                elapsed_sec: probe.elapsed_sec,
            });
        }
        trace!(
            "{} crossed {} at {:.0} ft after {:.0} s",
            input.callsign, leg.fix_id, probe.altitude_ft, probe.elapsed_sec
        );
    }
}

fn temperature_at(input: &TrajectoryInput<'_>, probe: &Probe) -> f64 {
    wind_at(&probe.position, probe.altitude_ft, input.weather)
        .map(|sample| sample.temperature_c)
        .unwrap_or_else(|| standard_temperature_c(probe.altitude_ft))
}

/// IAS at the start of the simulation, derived from the reported ground speed
fn initial_ias(input: &TrajectoryInput<'_>, performance: &AircraftPerformance) -> f64 {
    let state = input.state;
    let weather = wind_at(&state.position, state.altitude_ft, input.weather);
    let temperature = weather
        .map(|sample| sample.temperature_c)
        .unwrap_or_else(|| standard_temperature_c(state.altitude_ft));
    let preferred = performance.preferred_ias(state.altitude_ft, Some(temperature), input.flight_plan_tas);

    if state.ground_speed_kt <= 0.0 {
        return preferred;
    }
    let headwind = weather
        .map(|sample| {
            sample.wind.speed_kt
                * angular_difference(sample.wind.direction_deg, state.track_deg)
                    .to_radians()
                    .cos()
        })
        .unwrap_or(0.0);
    tas_to_ias(state.ground_speed_kt + headwind, state.altitude_ft, temperature).unwrap_or(preferred)
}

/// Target altitude and speed for each leg, ending with the threshold.
///
/// Arrival procedure altitudes are used where published; other points follow a
/// 3° path above the threshold. Targets never exceed the current altitude and
/// never increase along the route.
fn plan_legs<'i>(input: &TrajectoryInput<'i>, upcoming: &'i [RoutePoint]) -> Vec<Leg<'i>> {
    let threshold = input.runway;
    let threshold_ft = threshold.elevation_ft;

    // Along-route distance from each upcoming point to the threshold
    let mut to_threshold = vec![0.0; upcoming.len()];
    let mut accumulated = 0.0;
    let mut next = threshold.position;
    for (index, point) in upcoming.iter().enumerate().rev() {
        accumulated += point.position.distance_nm(&next);
        to_threshold[index] = accumulated;
        next = point.position;
    }

    let mut ceiling = input.state.altitude_ft.max(threshold_ft);
    let mut legs = Vec::with_capacity(upcoming.len() + 1);
    for (index, point) in upcoming.iter().enumerate() {
        let published = input
            .star
            .filter(|_| point.is_on_star)
            .and_then(|star| star.fix(&point.id))
            .and_then(|fix| fix.typical_altitude_ft);
        let planned = published.unwrap_or(threshold_ft + to_threshold[index] * GLIDE_PATH_FT_PER_NM);
        let target = planned.max(threshold_ft).min(ceiling);
        ceiling = target;

        legs.push(Leg {
            fix_id: &point.id,
            position: point.position,
            target_altitude_ft: target,
            target_ias_kt: input
                .star
                .and_then(|star| speed_expectation(upcoming, index, star)),
        });
    }

    legs.push(Leg {
        fix_id: &threshold.id,
        position: threshold.position,
        target_altitude_ft: threshold_ft,
        target_ias_kt: None,
    });
    legs
}

fn assemble_segments(
    legs: &[Leg<'_>],
    leg_totals: &[(f64, f64)],
    crossings: &[(f64, f64, f64)],
) -> Vec<DescentSegment> {
    let mut remaining_distance = 0.0;
    let mut remaining_time = 0.0;
    let mut segments = Vec::with_capacity(legs.len());

    for ((leg, (distance, duration)), (altitude, tas, ias)) in
        legs.iter().zip(leg_totals).zip(crossings).rev()
    {
        remaining_distance += distance;
        remaining_time += duration;
        let average_gs = if *duration > 0.0 {
            distance / duration * 3600.0
        } else {
            0.0
        };

        segments.push(DescentSegment {
            fix_id: leg.fix_id.to_string(),
            position: leg.position,
            target_altitude_ft: leg.target_altitude_ft.round() as i32,
            altitude_ft: altitude.round() as i32,
            remaining_distance_nm: remaining_distance,
            remaining_time_sec: remaining_time.round() as i64,
            ground_speed_kt: average_gs.round() as i32,
            tas_kt: tas.round() as i32,
            ias_kt: ias.round() as i32,
        });
    }

    segments.reverse();
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::PerformanceTable;
    use crate::route::{RawFix, resolve_remaining_route};
    use crate::weather::WeatherLayer;

    fn table() -> PerformanceTable {
        PerformanceTable::new(vec![AircraftPerformance {
            icao_type: "B738".to_string(),
            wake_category: WakeCategory::Medium,
            initial_descent_mach: Some(0.78),
            initial_descent_rod_fpm: Some(800.0),
            descent_rod_fpm: Some(3500.0),
            approach_rod_fpm: Some(1500.0),
            descent_ias_kt: 290.0,
            approach_ias_kt: 210.0,
            landing_vat_kt: 145.0,
        }])
    }

    fn runway() -> RunwayThreshold {
        RunwayThreshold {
            id: "01L".to_string(),
            position: GeoPoint::new(60.0, 11.0),
            elevation_ft: 700.0,
            true_heading_deg: 0.0,
        }
    }

    fn route(fixes: &[(&str, f64)]) -> RemainingRoute {
        let raw: Vec<RawFix> = fixes
            .iter()
            .map(|(id, lat)| RawFix::new(*id, GeoPoint::new(*lat, 11.0), false))
            .collect();
        resolve_remaining_route("ENGM", &raw, None).unwrap()
    }

    fn state(lat: f64, altitude_ft: f64) -> AircraftState {
        AircraftState {
            position: GeoPoint::new(lat, 11.0),
            altitude_ft,
            ground_speed_kt: 0.0,
            track_deg: 180.0,
        }
    }

    fn input<'a>(
        state: &'a AircraftState,
        route: &'a RemainingRoute,
        runway: &'a RunwayThreshold,
        weather: &'a [VerticalWeatherProfile],
    ) -> TrajectoryInput<'a> {
        TrajectoryInput {
            callsign: "SAS123",
            aircraft_type: "B738",
            state,
            route,
            runway,
            star: None,
            weather,
            flight_plan_tas: None,
        }
    }

    #[test]
    fn test_trajectory_ends_at_threshold() {
        let table = table();
        let builder = DescentTrajectoryBuilder::new(&table);
        let state = state(61.5, 20_000.0);
        let route = route(&[("A", 61.2), ("B", 60.8), ("C", 60.4)]);
        let runway = runway();

        let segments = builder
            .build_trajectory(&input(&state, &route, &runway, &[]))
            .unwrap();
        assert_eq!(segments.len(), 4);
        let ids: Vec<&str> = segments.iter().map(|s| s.fix_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "01L"]);

        let last = segments.last().unwrap();
        assert_eq!(last.position, runway.position);
        assert!((last.altitude_ft - 700).abs() <= 50);

        // Remaining distance and time shrink along the route
        for pair in segments.windows(2) {
            assert!(pair[0].remaining_distance_nm > pair[1].remaining_distance_nm);
            assert!(pair[0].remaining_time_sec > pair[1].remaining_time_sec);
            assert!(pair[0].altitude_ft >= pair[1].altitude_ft);
        }
        // 1.5 degrees of latitude is about 90 NM
        assert!((segments[0].remaining_distance_nm - 90.06).abs() < 0.5);
    }

    #[test]
    fn test_zero_wind_ground_speed_equals_tas() {
        let table = table();
        let builder = DescentTrajectoryBuilder::new(&table);
        let state = state(61.0, 12_000.0);
        let route = route(&[("A", 60.7), ("B", 60.4)]);
        let runway = runway();
        let calm = vec![VerticalWeatherProfile {
            time: DateTime::<Utc>::UNIX_EPOCH,
            position: GeoPoint::new(60.5, 11.0),
            layers: vec![
                WeatherLayer {
                    flight_level_ft: 0,
                    temperature_c: 10.0,
                    wind: WindVector::calm(),
                },
                WeatherLayer {
                    flight_level_ft: 20_000,
                    temperature_c: -25.0,
                    wind: WindVector::calm(),
                },
            ],
        }];

        let descent = builder
            .simulate(&input(&state, &route, &runway, &calm))
            .unwrap();
        assert!(!descent.steps.is_empty());
        for step in &descent.steps {
            assert_eq!(step.ground_speed_kt, step.tas_kt);
        }
    }

    #[test]
    fn test_headwind_slows_the_arrival() {
        let table = table();
        let builder = DescentTrajectoryBuilder::new(&table);
        let state = state(61.0, 12_000.0);
        let route = route(&[("A", 60.7), ("B", 60.4)]);
        let runway = runway();
        let southerly = vec![VerticalWeatherProfile {
            time: DateTime::<Utc>::UNIX_EPOCH,
            position: GeoPoint::new(60.5, 11.0),
            layers: vec![WeatherLayer {
                flight_level_ft: 5_000,
                temperature_c: 0.0,
                wind: WindVector::new(180.0, 40.0),
            }],
        }];

        let calm = builder
            .build_trajectory(&input(&state, &route, &runway, &[]))
            .unwrap();
        let windy = builder
            .build_trajectory(&input(&state, &route, &runway, &southerly))
            .unwrap();
        assert!(windy[0].remaining_time_sec > calm[0].remaining_time_sec);
    }

    #[test]
    fn test_unknown_type_and_empty_route() {
        let table = table();
        let builder = DescentTrajectoryBuilder::new(&table);
        let state = state(61.0, 12_000.0);
        let route = route(&[("A", 60.7)]);
        let runway = runway();

        let mut unknown = input(&state, &route, &runway, &[]);
        unknown.aircraft_type = "ZZZZ";
        assert!(matches!(
            builder.build_trajectory(&unknown),
            Err(TrajectoryError::UnknownAircraftType(_))
        ));

        let flown = RemainingRoute {
            arrival_airport_icao: "ENGM".to_string(),
            points: vec![RoutePoint {
                id: "A".to_string(),
                position: GeoPoint::new(60.7, 11.0),
                is_passed: true,
                is_on_star: false,
            }],
        };
        assert!(matches!(
            builder.build_trajectory(&input(&state, &flown, &runway, &[])),
            Err(TrajectoryError::EmptyTrajectory(_))
        ));
    }

    #[test]
    fn test_aircraft_heading_away_still_gets_a_trajectory() {
        let table = table();
        let builder = DescentTrajectoryBuilder::new(&table);
        // Outbound leg of a hold north of the last fix, flying away from it
        let state = AircraftState {
            position: GeoPoint::new(60.583, 11.0),
            altitude_ft: 9_000.0,
            ground_speed_kt: 220.0,
            track_deg: 0.0,
        };
        let route = route(&[("XEMEN", 60.5)]);
        let runway = runway();

        let segments = builder
            .build_trajectory(&input(&state, &route, &runway, &[]))
            .unwrap();
        let ids: Vec<&str> = segments.iter().map(|s| s.fix_id.as_str()).collect();
        assert_eq!(ids, vec!["XEMEN", "01L"]);
        assert!(segments[0].remaining_time_sec > 0);
    }

    #[test]
    fn test_too_high_reaches_end_of_route() {
        let table = table();
        let builder = DescentTrajectoryBuilder::new(&table);
        // 18 000 ft with under 20 NM to go
        let state = state(60.3, 18_000.0);
        let route = route(&[("A", 60.25), ("B", 60.15), ("C", 60.05)]);
        let runway = runway();

        match builder.build_trajectory(&input(&state, &route, &runway, &[])) {
            Err(TrajectoryError::ReachedEndOfRoute { best_effort, .. }) => {
                assert_eq!(best_effort.len(), 4);
                assert!(best_effort.last().unwrap().altitude_ft > 750);
            }
            other => panic!("expected ReachedEndOfRoute, got {other:?}"),
        }
    }

    #[test]
    fn test_star_altitudes_become_targets() {
        use crate::navdata::StarFix;

        let table = table();
        let builder = DescentTrajectoryBuilder::new(&table);
        let state = state(61.5, 25_000.0);
        let star = ArrivalProcedure {
            id: "TEST1A".to_string(),
            airport_icao: "ENGM".to_string(),
            runway: "01L".to_string(),
            fixes: vec![StarFix {
                id: "B".to_string(),
                typical_altitude_ft: Some(9_000.0),
                typical_ias_kt: Some(250.0),
            }],
        };
        let raw = vec![
            RawFix::new("A", GeoPoint::new(61.2, 11.0), false),
            RawFix::new("B", GeoPoint::new(60.8, 11.0), false),
        ];
        let route = resolve_remaining_route("ENGM", &raw, Some(&star)).unwrap();
        let runway = runway();
        let mut with_star = input(&state, &route, &runway, &[]);
        with_star.star = Some(&star);

        let segments = builder.build_trajectory(&with_star).unwrap();
        assert_eq!(segments[1].fix_id, "B");
        assert_eq!(segments[1].target_altitude_ft, 9_000);
        assert_eq!(segments[1].ias_kt, 250);
    }

    #[test]
    fn test_estimate_adds_remaining_time_to_now() {
        let table = table();
        let builder = DescentTrajectoryBuilder::new(&table);
        let state = state(61.0, 12_000.0);
        let route = route(&[("A", 60.7), ("B", 60.4)]);
        let runway = runway();
        let now = DateTime::parse_from_rfc3339("2025-06-01T12:00:00.750Z")
            .unwrap()
            .with_timezone(&Utc);

        let estimate = builder
            .estimate(&input(&state, &route, &runway, &[]), now)
            .unwrap();
        let expected = whole_seconds(now)
            + Duration::seconds(estimate.trajectory[0].remaining_time_sec);
        assert_eq!(estimate.estimated_time, expected);
        assert_eq!(estimate.landing_ias_kt, 145.0);
        assert_eq!(estimate.wake_category, WakeCategory::Medium);
        assert_eq!(estimate.estimated_time.timestamp_subsec_millis(), 0);
    }
}
