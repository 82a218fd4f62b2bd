//! Runway sequencing.
//!
//! Arrivals with an estimate are grouped by runway and ordered by their
//! preferred time. Each follower is scheduled no earlier than its leader plus
//! the separation required between the two. Aircraft that cannot be estimated
//! are still emitted, flagged with the reason.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::TrajectoryError;
use crate::performance::WakeCategory;
use crate::timeline::{
    NonSequencedReason, RunwayArrivalEvent, RunwayDepartureEvent, SequenceStatus, TimelineEvent,
};
use crate::trajectory::{DescentSegment, EstimatedArrival};

/// Spacing assumed for wake pairs without a specific entry
pub const DEFAULT_WAKE_SPACING_NM: f64 = 3.0;

/// What the separation policy needs to know about one aircraft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingSubject {
    pub wake_category: Option<WakeCategory>,
    pub landing_ias_kt: Option<f64>,
}

impl SpacingSubject {
    fn of_event(event: &TimelineEvent) -> Self {
        SpacingSubject {
            wake_category: event.wake_category(),
            landing_ias_kt: event
                .as_arrival()
                .and_then(|arrival| arrival.landing_ias_kt)
                .map(f64::from),
        }
    }
}

/// Minimum time between two aircraft crossing the same threshold
pub trait SeparationPolicy: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &'static str;

    fn separation(&self, leader: &SpacingSubject, follower: &SpacingSubject) -> Duration;
}

/// The same separation for every pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSeparation {
    pub separation_sec: i64,
}

impl SeparationPolicy for FixedSeparation {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn separation(&self, _leader: &SpacingSubject, _follower: &SpacingSubject) -> Duration {
        Duration::seconds(self.separation_sec)
    }
}

/// ICAO wake turbulence distances converted to time at the follower's landing speed.
///
/// Never less than `separation_sec`, and the distance is never less than
/// `minimum_spacing_nm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WakeSeparation {
    pub separation_sec: i64,
    pub minimum_spacing_nm: f64,
}

/// Required distance between a leader and follower of the given categories
pub fn wake_spacing_nm(leader: WakeCategory, follower: WakeCategory) -> f64 {
    use WakeCategory::*;
    match (leader, follower) {
        (Heavy, Heavy) => 4.0,
        (Heavy, Medium) => 5.0,
        (Heavy, Light) => 6.0,
        (Medium, Light) => 5.0,
        (Super, Heavy) => 6.0,
        (Super, Medium) => 7.0,
        (Super, Light) => 8.0,
        _ => DEFAULT_WAKE_SPACING_NM,
    }
}

impl SeparationPolicy for WakeSeparation {
    fn name(&self) -> &'static str {
        "wake"
    }

    fn separation(&self, leader: &SpacingSubject, follower: &SpacingSubject) -> Duration {
        let floor = Duration::seconds(self.separation_sec);
        let Some(landing_ias) = follower.landing_ias_kt.filter(|ias| *ias > 0.0) else {
            return floor;
        };
        let spacing_nm = match (leader.wake_category, follower.wake_category) {
            (Some(leader), Some(follower)) => wake_spacing_nm(leader, follower),
            _ => DEFAULT_WAKE_SPACING_NM,
        }
        .max(self.minimum_spacing_nm);

        let seconds = (spacing_nm / landing_ias * 3600.0).round() as i64;
        Duration::seconds(seconds).max(floor)
    }
}

/// An arrival offered to the sequencer
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalCandidate {
    pub callsign: String,
    pub icao_type: String,
    pub wake_category: Option<WakeCategory>,
    pub airport_icao: String,
    pub runway: Option<String>,
    pub assigned_star: Option<String>,
    pub navdata_derived: bool,
    pub tracking_controller: Option<String>,
    pub flight_level: i32,
    pub pressure_altitude_ft: i32,
    pub ground_speed_kt: i32,
    /// Order in which the aircraft was first seen by the timeline, lower wins ties
    pub registration_order: u64,
    pub estimate: Result<EstimatedArrival, TrajectoryError>,
}

/// A departure offered to the sequencer
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureCandidate {
    pub callsign: String,
    pub icao_type: String,
    pub wake_category: Option<WakeCategory>,
    pub airport_icao: String,
    pub runway: Option<String>,
    pub sid: Option<String>,
    pub tracking_controller: Option<String>,
    pub target_takeoff_time: Option<DateTime<Utc>>,
    pub registration_order: u64,
}

/// Inputs of one sequencing pass for a timeline group
#[derive(Debug, Clone, Copy)]
pub struct SequenceInput<'a> {
    pub timeline_group_id: &'a str,
    pub now: DateTime<Utc>,
    pub arrivals: &'a [ArrivalCandidate],
    pub departures: &'a [DepartureCandidate],
    /// Manually requested threshold times by callsign
    pub requested_times: &'a HashMap<String, DateTime<Utc>>,
}

/// Arrival awaiting a slot on its runway
struct Slot<'a> {
    candidate: &'a ArrivalCandidate,
    estimate: &'a EstimatedArrival,
    preferred_time: DateTime<Utc>,
}

/// Sort key for the published order
type OrderKey = (DateTime<Utc>, u64, String);

pub struct Sequencer {
    policy: Arc<dyn SeparationPolicy>,
    advisory_horizon: Duration,
}

impl Sequencer {
    pub fn new(policy: Arc<dyn SeparationPolicy>, advisory_horizon: Duration) -> Self {
        Self {
            policy,
            advisory_horizon,
        }
    }

    pub fn policy(&self) -> &dyn SeparationPolicy {
        self.policy.as_ref()
    }

    /// Produce the ordered timeline for one group.
    ///
    /// Sequenced events come first, ordered by scheduled time, then
    /// registration order, then callsign. Non-sequenced events follow, ordered
    /// by callsign. The output depends only on `input`.
    pub fn sequence(&self, input: &SequenceInput<'_>) -> Vec<TimelineEvent> {
        let mut sequenced: Vec<(OrderKey, TimelineEvent)> = Vec::new();
        let mut not_sequenced: Vec<TimelineEvent> = Vec::new();
        let mut by_runway: BTreeMap<&str, Vec<Slot<'_>>> = BTreeMap::new();

        for candidate in input.arrivals {
            let Some(runway) = candidate.runway.as_deref() else {
                not_sequenced.push(self.unsequenced_arrival(
                    input,
                    candidate,
                    NonSequencedReason::NoAssignedRunway,
                    Vec::new(),
                ));
                continue;
            };

            match &candidate.estimate {
                Ok(estimate) => {
                    let preferred_time = match input.requested_times.get(&candidate.callsign) {
                        Some(requested) if *requested > estimate.estimated_time => *requested,
                        _ => estimate.estimated_time,
                    };
                    by_runway.entry(runway).or_default().push(Slot {
                        candidate,
                        estimate,
                        preferred_time,
                    });
                }
                Err(error) => {
                    let reason = error.non_sequenced_reason();
                    if reason == NonSequencedReason::UnknownError {
                        warn!(
                            "Unclassified estimation failure for {} in timeline {}: {}",
                            candidate.callsign, input.timeline_group_id, error
                        );
                    } else {
                        debug!(
                            "{} not sequenced in timeline {}: {}",
                            candidate.callsign, input.timeline_group_id, error
                        );
                    }
                    let trajectory = error
                        .best_effort_trajectory()
                        .map(<[_]>::to_vec)
                        .unwrap_or_default();
                    not_sequenced.push(self.unsequenced_arrival(input, candidate, reason, trajectory));
                }
            }
        }

        for (runway, mut slots) in by_runway {
            slots.sort_by(|a, b| {
                a.preferred_time
                    .cmp(&b.preferred_time)
                    .then(a.candidate.registration_order.cmp(&b.candidate.registration_order))
                    .then_with(|| a.candidate.callsign.cmp(&b.candidate.callsign))
            });

            let mut previous: Option<(&Slot<'_>, DateTime<Utc>)> = None;
            for slot in &slots {
                let scheduled = match previous {
                    Some((leader, leader_time)) => {
                        let spacing = self
                            .policy
                            .separation(&subject_of(leader), &subject_of(slot));
                        slot.preferred_time.max(leader_time + spacing)
                    }
                    None => slot.preferred_time,
                };
                // A manual time can put a closer aircraft behind a farther one
                let distance_to_preceding = previous.map(|(leader, _)| {
                    (slot.estimate.remaining_distance_nm - leader.estimate.remaining_distance_nm)
                        .max(0.0)
                });

                let event = self.sequenced_arrival(input, runway, slot, scheduled, distance_to_preceding);
                sequenced.push((
                    (
                        scheduled,
                        slot.candidate.registration_order,
                        slot.candidate.callsign.clone(),
                    ),
                    event,
                ));
                previous = Some((slot, scheduled));
            }
        }

        for departure in input.departures {
            if departure.runway.is_none() {
                not_sequenced.push(self.departure_event(
                    input,
                    departure,
                    SequenceStatus::NotSequenced(NonSequencedReason::NoAssignedRunway),
                ));
                continue;
            }
            let Some(takeoff) = departure.target_takeoff_time else {
                continue;
            };
            sequenced.push((
                (takeoff, departure.registration_order, departure.callsign.clone()),
                self.departure_event(input, departure, SequenceStatus::Sequenced),
            ));
        }

        sequenced.sort_by(|(a, _), (b, _)| a.cmp(b));
        not_sequenced.sort_by(|a, b| a.callsign().cmp(b.callsign()));

        sequenced
            .into_iter()
            .map(|(_, event)| event)
            .chain(not_sequenced)
            .collect()
    }

    fn within_horizon(&self, now: DateTime<Utc>, time: Option<DateTime<Utc>>) -> bool {
        time.is_some_and(|time| time - now < self.advisory_horizon)
    }

    fn sequenced_arrival(
        &self,
        input: &SequenceInput<'_>,
        runway: &str,
        slot: &Slot<'_>,
        scheduled: DateTime<Utc>,
        distance_to_preceding_nm: Option<f64>,
    ) -> TimelineEvent {
        let candidate = slot.candidate;
        let estimate = slot.estimate;
        TimelineEvent::Arrival(RunwayArrivalEvent {
            timeline_group_id: input.timeline_group_id.to_string(),
            callsign: candidate.callsign.clone(),
            icao_type: candidate.icao_type.clone(),
            wake_category: Some(estimate.wake_category),
            airport_icao: candidate.airport_icao.clone(),
            runway: Some(runway.to_string()),
            tracking_controller: candidate.tracking_controller.clone(),
            scheduled_time: Some(scheduled),
            estimated_time: Some(estimate.estimated_time),
            assigned_star: candidate.assigned_star.clone(),
            navdata_derived: candidate.navdata_derived,
            flight_level: candidate.flight_level,
            pressure_altitude_ft: candidate.pressure_altitude_ft,
            ground_speed_kt: candidate.ground_speed_kt,
            remaining_distance_nm: Some(estimate.remaining_distance_nm),
            distance_to_preceding_nm,
            landing_ias_kt: Some(estimate.landing_ias_kt.round() as i32),
            descent_trajectory: estimate.trajectory.clone(),
            within_active_advisory_horizon: self
                .within_horizon(input.now, Some(estimate.estimated_time)),
            sequence_status: SequenceStatus::Sequenced,
        })
    }

    fn unsequenced_arrival(
        &self,
        input: &SequenceInput<'_>,
        candidate: &ArrivalCandidate,
        reason: NonSequencedReason,
        descent_trajectory: Vec<DescentSegment>,
    ) -> TimelineEvent {
        TimelineEvent::Arrival(RunwayArrivalEvent {
            timeline_group_id: input.timeline_group_id.to_string(),
            callsign: candidate.callsign.clone(),
            icao_type: candidate.icao_type.clone(),
            wake_category: candidate.wake_category,
            airport_icao: candidate.airport_icao.clone(),
            runway: candidate.runway.clone(),
            tracking_controller: candidate.tracking_controller.clone(),
            scheduled_time: None,
            estimated_time: None,
            assigned_star: candidate.assigned_star.clone(),
            navdata_derived: candidate.navdata_derived,
            flight_level: candidate.flight_level,
            pressure_altitude_ft: candidate.pressure_altitude_ft,
            ground_speed_kt: candidate.ground_speed_kt,
            remaining_distance_nm: descent_trajectory
                .first()
                .map(|segment| segment.remaining_distance_nm),
            distance_to_preceding_nm: None,
            landing_ias_kt: None,
            descent_trajectory,
            within_active_advisory_horizon: false,
            sequence_status: SequenceStatus::NotSequenced(reason),
        })
    }

    fn departure_event(
        &self,
        input: &SequenceInput<'_>,
        departure: &DepartureCandidate,
        sequence_status: SequenceStatus,
    ) -> TimelineEvent {
        let time = departure
            .target_takeoff_time
            .filter(|_| sequence_status.is_sequenced());
        TimelineEvent::Departure(RunwayDepartureEvent {
            timeline_group_id: input.timeline_group_id.to_string(),
            callsign: departure.callsign.clone(),
            icao_type: departure.icao_type.clone(),
            wake_category: departure.wake_category,
            airport_icao: departure.airport_icao.clone(),
            runway: departure.runway.clone(),
            sid: departure.sid.clone(),
            tracking_controller: departure.tracking_controller.clone(),
            scheduled_time: time,
            estimated_time: time,
            within_active_advisory_horizon: self.within_horizon(input.now, time),
            sequence_status,
        })
    }
}

fn subject_of(slot: &Slot<'_>) -> SpacingSubject {
    SpacingSubject {
        wake_category: Some(slot.estimate.wake_category),
        landing_ias_kt: Some(slot.estimate.landing_ias_kt),
    }
}

/// Whether `callsign` could cross its runway threshold at `requested_time`.
///
/// Only the closest other sequenced aircraft on the same runway at or before
/// the requested time is considered; followers are not checked. Aircraft not
/// sequenced in `timeline` never have a slot.
pub fn is_time_slot_available(
    timeline: &[TimelineEvent],
    callsign: &str,
    requested_time: DateTime<Utc>,
    policy: &dyn SeparationPolicy,
) -> bool {
    let Some(subject) = timeline
        .iter()
        .find(|event| event.callsign() == callsign && event.is_sequenced())
    else {
        return false;
    };

    let leader = timeline
        .iter()
        .filter(|event| {
            event.is_sequenced()
                && event.callsign() != callsign
                && event.runway() == subject.runway()
        })
        .filter_map(|event| {
            event
                .scheduled_time()
                .filter(|time| *time <= requested_time)
                .map(|time| (time, event))
        })
        .max_by_key(|(time, _)| *time);

    match leader {
        None => true,
        Some((leader_time, leader)) => {
            let spacing = policy.separation(
                &SpacingSubject::of_event(leader),
                &SpacingSubject::of_event(subject),
            );
            requested_time >= leader_time + spacing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn estimate(offset_sec: i64, distance_nm: f64, wake: WakeCategory) -> EstimatedArrival {
        EstimatedArrival {
            trajectory: vec![DescentSegment {
                fix_id: "01L".to_string(),
                position: GeoPoint::new(60.0, 11.0),
                target_altitude_ft: 700,
                altitude_ft: 700,
                remaining_distance_nm: distance_nm,
                remaining_time_sec: offset_sec,
                ground_speed_kt: 200,
                tas_kt: 200,
                ias_kt: 180,
            }],
            estimated_time: t0() + Duration::seconds(offset_sec),
            remaining_distance_nm: distance_nm,
            landing_ias_kt: 140.0,
            wake_category: wake,
        }
    }

    fn arrival(
        callsign: &str,
        order: u64,
        runway: Option<&str>,
        estimate: Result<EstimatedArrival, TrajectoryError>,
    ) -> ArrivalCandidate {
        ArrivalCandidate {
            callsign: callsign.to_string(),
            icao_type: "A320".to_string(),
            wake_category: Some(WakeCategory::Medium),
            airport_icao: "ENGM".to_string(),
            runway: runway.map(str::to_string),
            assigned_star: None,
            navdata_derived: false,
            tracking_controller: None,
            flight_level: 100,
            pressure_altitude_ft: 10_000,
            ground_speed_kt: 280,
            registration_order: order,
            estimate,
        }
    }

    fn sequencer(separation_sec: i64) -> Sequencer {
        Sequencer::new(
            Arc::new(FixedSeparation { separation_sec }),
            Duration::minutes(30),
        )
    }

    fn run(sequencer: &Sequencer, arrivals: &[ArrivalCandidate]) -> Vec<TimelineEvent> {
        let requested = HashMap::new();
        sequencer.sequence(&SequenceInput {
            timeline_group_id: "ENGM",
            now: t0(),
            arrivals,
            departures: &[],
            requested_times: &requested,
        })
    }

    #[test]
    fn test_follower_is_pushed_back_by_separation() {
        let arrivals = vec![
            arrival("SAS1", 0, Some("01L"), Ok(estimate(100, 20.0, WakeCategory::Medium))),
            arrival("SAS2", 1, Some("01L"), Ok(estimate(110, 22.0, WakeCategory::Medium))),
        ];
        let events = run(&sequencer(60), &arrivals);

        assert_eq!(events[0].callsign(), "SAS1");
        assert_eq!(events[0].scheduled_time(), Some(t0() + Duration::seconds(100)));
        assert_eq!(events[1].scheduled_time(), Some(t0() + Duration::seconds(160)));
        assert_eq!(events[1].estimated_time(), Some(t0() + Duration::seconds(110)));

        let follower = events[1].as_arrival().unwrap();
        assert_eq!(follower.distance_to_preceding_nm, Some(2.0));
    }

    #[test]
    fn test_runways_are_sequenced_independently() {
        let arrivals = vec![
            arrival("SAS1", 0, Some("01L"), Ok(estimate(100, 20.0, WakeCategory::Medium))),
            arrival("SAS2", 1, Some("01R"), Ok(estimate(110, 22.0, WakeCategory::Medium))),
        ];
        let events = run(&sequencer(60), &arrivals);
        assert_eq!(events[1].scheduled_time(), Some(t0() + Duration::seconds(110)));
    }

    #[test]
    fn test_tie_goes_to_earlier_registration() {
        let arrivals = vec![
            arrival("ZZZ9", 0, Some("01L"), Ok(estimate(100, 20.0, WakeCategory::Medium))),
            arrival("AAA1", 1, Some("01L"), Ok(estimate(100, 20.0, WakeCategory::Medium))),
        ];
        let events = run(&sequencer(90), &arrivals);
        assert_eq!(events[0].callsign(), "ZZZ9");
        assert_eq!(events[1].callsign(), "AAA1");
        assert_eq!(events[1].scheduled_time(), Some(t0() + Duration::seconds(190)));

        // Same result whatever order the candidates arrive in
        let reversed: Vec<ArrivalCandidate> = arrivals.iter().rev().cloned().collect();
        assert_eq!(run(&sequencer(90), &reversed), events);
    }

    #[test]
    fn test_failures_become_non_sequenced_events() {
        let arrivals = vec![
            arrival("NORW", 0, None, Ok(estimate(100, 20.0, WakeCategory::Medium))),
            arrival(
                "TYPE",
                1,
                Some("01L"),
                Err(TrajectoryError::UnknownAircraftType("ZZZZ".into())),
            ),
            arrival("ROUT", 2, Some("01L"), Err(TrajectoryError::EmptyRoute("none".into()))),
            arrival(
                "HIGH",
                3,
                Some("01L"),
                Err(TrajectoryError::ReachedEndOfRoute {
                    message: "too high".into(),
                    best_effort: estimate(300, 15.0, WakeCategory::Medium).trajectory,
                }),
            ),
            arrival("OKAY", 4, Some("01L"), Ok(estimate(100, 20.0, WakeCategory::Medium))),
        ];
        let events = run(&sequencer(60), &arrivals);

        assert_eq!(events[0].callsign(), "OKAY");
        let rest: Vec<(&str, Option<NonSequencedReason>)> = events[1..]
            .iter()
            .map(|event| (event.callsign(), event.sequence_status().reason()))
            .collect();
        assert_eq!(
            rest,
            vec![
                ("HIGH", Some(NonSequencedReason::ExcessAltitude)),
                ("NORW", Some(NonSequencedReason::NoAssignedRunway)),
                ("ROUT", Some(NonSequencedReason::EmptyRoute)),
                ("TYPE", Some(NonSequencedReason::MissingPerformanceData)),
            ]
        );

        let high = events[1].as_arrival().unwrap();
        assert_eq!(high.descent_trajectory.len(), 1);
        assert!(high.scheduled_time.is_none());
        let no_runway = events[2].as_arrival().unwrap();
        assert!(no_runway.descent_trajectory.is_empty());
        assert!(no_runway.estimated_time.is_none());
    }

    #[test]
    fn test_requested_time_only_delays() {
        let arrivals = vec![
            arrival("SAS1", 0, Some("01L"), Ok(estimate(100, 20.0, WakeCategory::Medium))),
            arrival("SAS2", 1, Some("01L"), Ok(estimate(200, 30.0, WakeCategory::Medium))),
        ];
        let mut requested = HashMap::new();
        // Earlier than estimated: ignored
        requested.insert("SAS2".to_string(), t0() + Duration::seconds(50));
        // Later than estimated: SAS1 goes behind SAS2
        requested.insert("SAS1".to_string(), t0() + Duration::seconds(400));

        let events = sequencer(60).sequence(&SequenceInput {
            timeline_group_id: "ENGM",
            now: t0(),
            arrivals: &arrivals,
            departures: &[],
            requested_times: &requested,
        });
        assert_eq!(events[0].callsign(), "SAS2");
        assert_eq!(events[0].scheduled_time(), Some(t0() + Duration::seconds(200)));
        assert_eq!(events[1].callsign(), "SAS1");
        assert_eq!(events[1].scheduled_time(), Some(t0() + Duration::seconds(400)));
        assert_eq!(events[1].estimated_time(), Some(t0() + Duration::seconds(100)));

        // SAS1 is 10 NM closer than the aircraft it now follows
        let follower = events[1].as_arrival().unwrap();
        assert_eq!(follower.distance_to_preceding_nm, Some(0.0));
    }

    #[test]
    fn test_departures() {
        let departures = vec![
            DepartureCandidate {
                callsign: "DEP1".to_string(),
                icao_type: "B738".to_string(),
                wake_category: Some(WakeCategory::Medium),
                airport_icao: "ENGM".to_string(),
                runway: Some("19R".to_string()),
                sid: Some("OSLO1A".to_string()),
                tracking_controller: None,
                target_takeoff_time: Some(t0() + Duration::seconds(50)),
                registration_order: 0,
            },
            DepartureCandidate {
                callsign: "DEP2".to_string(),
                icao_type: "B738".to_string(),
                wake_category: None,
                airport_icao: "ENGM".to_string(),
                runway: None,
                sid: None,
                tracking_controller: None,
                target_takeoff_time: Some(t0()),
                registration_order: 1,
            },
            DepartureCandidate {
                callsign: "DEP3".to_string(),
                icao_type: "B738".to_string(),
                wake_category: None,
                airport_icao: "ENGM".to_string(),
                runway: Some("19R".to_string()),
                sid: None,
                tracking_controller: None,
                target_takeoff_time: None,
                registration_order: 2,
            },
        ];
        let requested = HashMap::new();
        let events = sequencer(60).sequence(&SequenceInput {
            timeline_group_id: "ENGM-DEP",
            now: t0(),
            arrivals: &[],
            departures: &departures,
            requested_times: &requested,
        });

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].callsign(), "DEP1");
        assert_eq!(events[0].scheduled_time(), events[0].estimated_time());
        assert!(events[0].is_sequenced());
        assert_eq!(
            events[1].sequence_status(),
            SequenceStatus::NotSequenced(NonSequencedReason::NoAssignedRunway)
        );
    }

    #[test]
    fn test_advisory_horizon() {
        let arrivals = vec![
            arrival("NEAR", 0, Some("01L"), Ok(estimate(600, 40.0, WakeCategory::Medium))),
            arrival("FAR1", 1, Some("01L"), Ok(estimate(3600, 250.0, WakeCategory::Medium))),
        ];
        let events = run(&sequencer(60), &arrivals);
        assert!(events[0].as_arrival().unwrap().within_active_advisory_horizon);
        assert!(!events[1].as_arrival().unwrap().within_active_advisory_horizon);
    }

    #[test]
    fn test_wake_separation() {
        let policy = WakeSeparation {
            separation_sec: 60,
            minimum_spacing_nm: 3.0,
        };
        let heavy = SpacingSubject {
            wake_category: Some(WakeCategory::Heavy),
            landing_ias_kt: Some(150.0),
        };
        let light = SpacingSubject {
            wake_category: Some(WakeCategory::Light),
            landing_ias_kt: Some(120.0),
        };
        // 6 NM at 120 kt
        assert_eq!(policy.separation(&heavy, &light), Duration::seconds(180));
        // 3 NM at 150 kt is 72 s
        assert_eq!(policy.separation(&light, &heavy), Duration::seconds(72));

        let slow_floor = WakeSeparation {
            separation_sec: 120,
            minimum_spacing_nm: 3.0,
        };
        assert_eq!(slow_floor.separation(&light, &heavy), Duration::seconds(120));

        let unknown_speed = SpacingSubject {
            wake_category: Some(WakeCategory::Light),
            landing_ias_kt: None,
        };
        assert_eq!(policy.separation(&heavy, &unknown_speed), Duration::seconds(60));
    }

    #[test]
    fn test_time_slot_availability() {
        let arrivals = vec![
            arrival("SAS1", 0, Some("01L"), Ok(estimate(100, 20.0, WakeCategory::Medium))),
            arrival("SAS2", 1, Some("01L"), Ok(estimate(300, 30.0, WakeCategory::Medium))),
            arrival("NORW", 2, None, Ok(estimate(100, 20.0, WakeCategory::Medium))),
        ];
        let sequencer = sequencer(60);
        let events = run(&sequencer, &arrivals);
        let policy = sequencer.policy();

        assert!(is_time_slot_available(&events, "SAS2", t0() + Duration::seconds(160), policy));
        assert!(!is_time_slot_available(&events, "SAS2", t0() + Duration::seconds(159), policy));
        // Nobody ahead
        assert!(is_time_slot_available(&events, "SAS1", t0() + Duration::seconds(10), policy));
        assert!(!is_time_slot_available(&events, "NORW", t0() + Duration::seconds(900), policy));
        assert!(!is_time_slot_available(&events, "XXXX", t0(), policy));
    }
}
