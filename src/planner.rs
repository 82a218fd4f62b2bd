//! The planner ties estimation and sequencing together.
//!
//! Aircraft reports arrive independently and each one is estimated on the
//! blocking pool. Results are tagged with the revision of the report they were
//! computed from and dropped if a newer report came in meanwhile. A periodic
//! recompute runs the sequencer for every registered timeline and publishes a
//! complete snapshot per group through a `watch` channel, so readers only ever
//! see whole timelines.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, oneshot, watch};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span};

use crate::adapter::{
    ArrivalReport, DepartureReport, MessageFromAtcClient, TimelineSink, TimelineSnapshot,
};
use crate::config::PlannerConfigFile;
use crate::errors::TrajectoryError;
use crate::navdata::Airport;
use crate::performance::PerformanceLookup;
use crate::registration::{RegistrationError, TimelineGroup, TimelineRegistration};
use crate::route::{RawFix, resolve_remaining_route};
use crate::sequencer::{
    ArrivalCandidate, DepartureCandidate, SequenceInput, Sequencer, is_time_slot_available,
};
use crate::trajectory::{DescentTrajectoryBuilder, EstimatedArrival, TrajectoryInput};
use crate::weather::VerticalWeatherProfile;

/// Outcome of estimating one arrival report
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalEstimate {
    pub runway: Option<String>,
    /// The assigned STAR was found in the navigation data
    pub navdata_derived: bool,
    pub result: Result<EstimatedArrival, TrajectoryError>,
}

struct TrackedArrival {
    report: ArrivalReport,
    /// Revision of the latest report
    revision: u64,
    registration_order: u64,
    last_seen: DateTime<Utc>,
    /// Latest stored estimate and the revision it was computed from
    estimate: Option<(u64, ArrivalEstimate)>,
}

struct TrackedDeparture {
    report: DepartureReport,
    registration_order: u64,
    last_seen: DateTime<Utc>,
}

struct GroupState {
    group: TimelineGroup,
    /// Manually requested threshold times by callsign
    requested_times: HashMap<String, DateTime<Utc>>,
    generation: u64,
    publisher: watch::Sender<Arc<TimelineSnapshot>>,
}

/// Result of handling one message from the ATC client
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    Handled,
    /// A suggested time was rejected because it would break separation
    SlotUnavailable { request_id: u32, callsign: String },
}

pub struct Planner {
    airports: Arc<HashMap<String, Airport>>,
    performance: Arc<dyn PerformanceLookup>,
    sequencer: Sequencer,
    stale_after: Duration,
    recompute_interval: std::time::Duration,
    arrivals: DashMap<String, TrackedArrival>,
    departures: DashMap<String, TrackedDeparture>,
    groups: DashMap<u32, GroupState>,
    weather: RwLock<Arc<Vec<VerticalWeatherProfile>>>,
    next_revision: AtomicU64,
    next_registration: AtomicU64,
}

impl Planner {
    pub fn new(config: &PlannerConfigFile, performance: Arc<dyn PerformanceLookup>) -> Self {
        Self {
            airports: Arc::new(config.airports_by_icao()),
            performance,
            sequencer: Sequencer::new(config.separation_policy(), config.advisory_horizon()),
            stale_after: config.stale_after(),
            recompute_interval: config.recompute_interval(),
            arrivals: DashMap::new(),
            departures: DashMap::new(),
            groups: DashMap::new(),
            weather: RwLock::new(Arc::new(Vec::new())),
            next_revision: AtomicU64::new(1),
            next_registration: AtomicU64::new(0),
        }
    }

    /// Register, replace or remove a timeline
    pub fn register(
        &self,
        registration: &TimelineRegistration,
        now: DateTime<Utc>,
    ) -> Result<(), RegistrationError> {
        let request_id = registration.request_id();
        match TimelineGroup::from_registration(registration)? {
            Some(group) => {
                if let Some(mut existing) = self.groups.get_mut(&request_id) {
                    info!("Replacing timeline {}", request_id);
                    existing.group = group;
                } else {
                    info!("Registered timeline {}", request_id);
                    let (publisher, _) =
                        watch::channel(Arc::new(TimelineSnapshot::empty(group.id(), now)));
                    self.groups.insert(
                        request_id,
                        GroupState {
                            group,
                            requested_times: HashMap::new(),
                            generation: 0,
                            publisher,
                        },
                    );
                }
            }
            None => self.unregister(request_id)?,
        }
        metrics::gauge!("planner.timelines").set(self.groups.len() as f64);
        Ok(())
    }

    pub fn unregister(&self, request_id: u32) -> Result<(), RegistrationError> {
        self.groups
            .remove(&request_id)
            .ok_or(RegistrationError::UnknownTimeline(request_id))?;
        info!("Unregistered timeline {}", request_id);
        metrics::gauge!("planner.timelines").set(self.groups.len() as f64);
        Ok(())
    }

    /// Receiver for the published snapshots of one timeline
    pub fn subscribe(&self, request_id: u32) -> Option<watch::Receiver<Arc<TimelineSnapshot>>> {
        self.groups
            .get(&request_id)
            .map(|state| state.publisher.subscribe())
    }

    /// Latest published snapshot of one timeline
    pub fn latest(&self, request_id: u32) -> Option<Arc<TimelineSnapshot>> {
        self.groups
            .get(&request_id)
            .map(|state| state.publisher.borrow().clone())
    }

    pub fn tracked_arrivals(&self) -> usize {
        self.arrivals.len()
    }

    pub fn tracked_departures(&self) -> usize {
        self.departures.len()
    }

    /// Apply one message from the ATC client
    pub async fn handle_message(
        self: &Arc<Self>,
        message: MessageFromAtcClient,
        received_at: DateTime<Utc>,
    ) -> Result<MessageOutcome> {
        match message {
            MessageFromAtcClient::Arrivals { inbounds } => {
                self.handle_arrivals(inbounds, received_at).await;
            }
            MessageFromAtcClient::Departures { outbounds } => {
                for report in outbounds {
                    self.handle_departure(report, received_at);
                }
            }
            MessageFromAtcClient::Weather { profiles } => {
                self.update_weather(profiles).await;
            }
            MessageFromAtcClient::Timeline { registration } => {
                self.register(&registration, received_at)?;
            }
            MessageFromAtcClient::SuggestScheduledTime {
                request_id,
                callsign,
                scheduled_time,
            } => {
                if !self.is_time_slot_available(request_id, &callsign, scheduled_time) {
                    info!(
                        "Rejected suggested time {} for {} in timeline {}",
                        scheduled_time, callsign, request_id
                    );
                    return Ok(MessageOutcome::SlotUnavailable {
                        request_id,
                        callsign,
                    });
                }
                self.request_scheduled_time(request_id, &callsign, scheduled_time)?;
            }
            MessageFromAtcClient::RemoveFromSequence {
                request_id,
                callsign,
            } => {
                self.remove_from_sequence(request_id, &callsign)?;
            }
        }
        Ok(MessageOutcome::Handled)
    }

    /// Estimate a batch of reports concurrently
    ///
    /// Revisions are handed out in batch order before any task starts, so a
    /// later report for the same callsign always wins.
    pub async fn handle_arrivals(
        self: &Arc<Self>,
        reports: Vec<ArrivalReport>,
        received_at: DateTime<Utc>,
    ) {
        let mut tasks = JoinSet::new();
        for report in reports {
            let revision = self.next_revision.fetch_add(1, Ordering::Relaxed);
            let planner = Arc::clone(self);
            tasks.spawn(async move {
                planner
                    .track_arrival(report, revision, received_at)
                    .await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Arrival estimation task failed: {}", e);
            }
        }
    }

    /// Record the latest state of one arrival and estimate it
    pub async fn handle_arrival(&self, report: ArrivalReport, received_at: DateTime<Utc>) {
        let revision = self.next_revision.fetch_add(1, Ordering::Relaxed);
        self.track_arrival(report, revision, received_at).await;
    }

    async fn track_arrival(
        &self,
        report: ArrivalReport,
        revision: u64,
        received_at: DateTime<Utc>,
    ) {
        {
            let mut tracked = self
                .arrivals
                .entry(report.callsign.clone())
                .or_insert_with(|| {
                    let registration_order =
                        self.next_registration.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        "Tracking new arrival {} (order {})",
                        report.callsign, registration_order
                    );
                    TrackedArrival {
                        report: report.clone(),
                        revision,
                        registration_order,
                        last_seen: received_at,
                        estimate: None,
                    }
                });
            // A report that lost the race to a newer one must not replace it
            if revision < tracked.revision {
                debug!(
                    "Ignoring report for {} (revision {}, latest {})",
                    report.callsign, revision, tracked.revision
                );
                return;
            }
            tracked.report = report.clone();
            tracked.revision = revision;
            tracked.last_seen = tracked.last_seen.max(received_at);
        }
        metrics::gauge!("planner.tracked_arrivals").set(self.arrivals.len() as f64);

        self.estimate_revision(report, revision, received_at).await;
    }

    async fn estimate_revision(
        &self,
        report: ArrivalReport,
        revision: u64,
        state_time: DateTime<Utc>,
    ) {
        let callsign = report.callsign.clone();
        let airports = Arc::clone(&self.airports);
        let performance = Arc::clone(&self.performance);
        let weather = self.weather.read().await.clone();
        let span = info_span!("estimate", callsign = %callsign, revision);

        let computed = tokio::task::spawn_blocking(move || {
            span.in_scope(|| {
                estimate_arrival(&airports, performance.as_ref(), &weather, &report, state_time)
            })
        })
        .await;

        let estimate = match computed {
            Ok(estimate) => estimate,
            Err(e) => {
                error!("Estimation for {} panicked or was cancelled: {}", callsign, e);
                ArrivalEstimate {
                    runway: None,
                    navdata_derived: false,
                    result: Err(TrajectoryError::Other(format!("estimation task failed: {}", e))),
                }
            }
        };

        match &estimate.result {
            Ok(_) => metrics::counter!("planner.estimates_computed_total").increment(1),
            Err(e) => {
                let reason = e.non_sequenced_reason();
                debug!("Estimate for {} failed: {}", callsign, e);
                metrics::counter!("planner.estimates_failed_total", "reason" => reason.as_str())
                    .increment(1);
            }
        }

        match self.arrivals.get_mut(&callsign) {
            Some(mut tracked) if tracked.revision == revision => {
                tracked.estimate = Some((revision, estimate));
            }
            Some(tracked) => {
                debug!(
                    "Discarding stale estimate for {} (revision {}, latest {})",
                    callsign, revision, tracked.revision
                );
                metrics::counter!("planner.estimates_stale_total").increment(1);
            }
            None => {
                debug!("Discarding estimate for {}: no longer tracked", callsign);
                metrics::counter!("planner.estimates_stale_total").increment(1);
            }
        }
    }

    pub fn handle_departure(&self, report: DepartureReport, received_at: DateTime<Utc>) {
        self.departures
            .entry(report.callsign.clone())
            .and_modify(|tracked| {
                tracked.report = report.clone();
                tracked.last_seen = received_at;
            })
            .or_insert_with(|| TrackedDeparture {
                report: report.clone(),
                registration_order: self.next_registration.fetch_add(1, Ordering::Relaxed),
                last_seen: received_at,
            });
        metrics::gauge!("planner.tracked_departures").set(self.departures.len() as f64);
    }

    /// Swap in a new weather snapshot and re-estimate every tracked arrival with it
    pub async fn update_weather(&self, profiles: Vec<VerticalWeatherProfile>) {
        let count = profiles.len();
        *self.weather.write().await = Arc::new(profiles);
        info!("Weather updated with {} vertical profiles", count);

        let pending: Vec<(ArrivalReport, u64, DateTime<Utc>)> = self
            .arrivals
            .iter_mut()
            .map(|mut tracked| {
                let revision = self.next_revision.fetch_add(1, Ordering::Relaxed);
                tracked.revision = revision;
                (tracked.report.clone(), revision, tracked.last_seen)
            })
            .collect();

        for (report, revision, state_time) in pending {
            self.estimate_revision(report, revision, state_time).await;
        }
    }

    /// Ask for an aircraft to cross its threshold no earlier than `time`
    pub fn request_scheduled_time(
        &self,
        request_id: u32,
        callsign: &str,
        time: DateTime<Utc>,
    ) -> Result<(), RegistrationError> {
        let mut state = self
            .groups
            .get_mut(&request_id)
            .ok_or(RegistrationError::UnknownTimeline(request_id))?;
        info!(
            "Scheduled time {} requested for {} in timeline {}",
            time, callsign, request_id
        );
        state.requested_times.insert(callsign.to_string(), time);
        Ok(())
    }

    /// Drop any manual time for `callsign` and queue it again as if newly seen
    pub fn remove_from_sequence(
        &self,
        request_id: u32,
        callsign: &str,
    ) -> Result<(), RegistrationError> {
        let mut state = self
            .groups
            .get_mut(&request_id)
            .ok_or(RegistrationError::UnknownTimeline(request_id))?;
        state.requested_times.remove(callsign);
        drop(state);

        if let Some(mut tracked) = self.arrivals.get_mut(callsign) {
            tracked.registration_order = self.next_registration.fetch_add(1, Ordering::Relaxed);
        }
        info!("Removed {} from the sequence of timeline {}", callsign, request_id);
        Ok(())
    }

    /// Whether `callsign` could be moved to `time` in the latest published timeline
    pub fn is_time_slot_available(
        &self,
        request_id: u32,
        callsign: &str,
        time: DateTime<Utc>,
    ) -> bool {
        let Some(snapshot) = self.latest(request_id) else {
            return false;
        };
        is_time_slot_available(&snapshot.events, callsign, time, self.sequencer.policy())
    }

    /// Forget aircraft that have not reported for longer than the stale limit
    pub fn purge_stale(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.stale_after;
        let before = self.arrivals.len() + self.departures.len();

        self.arrivals.retain(|callsign, tracked| {
            let keep = tracked.last_seen >= cutoff;
            if !keep {
                debug!("Dropping stale arrival {}", callsign);
            }
            keep
        });
        self.departures.retain(|_, tracked| tracked.last_seen >= cutoff);

        let removed = before - (self.arrivals.len() + self.departures.len());
        if removed > 0 {
            metrics::counter!("planner.purged_aircraft_total").increment(removed as u64);
            debug!("Purged {} stale aircraft", removed);
        }
        removed
    }

    /// Sequence every registered timeline and publish the results
    ///
    /// # Returns
    /// The snapshots published in this cycle, one per timeline
    pub fn recompute(&self, now: DateTime<Utc>) -> Vec<Arc<TimelineSnapshot>> {
        self.purge_stale(now);

        let arrivals = self.arrival_candidates();
        let departures = self.departure_candidates();
        let mut published = Vec::with_capacity(self.groups.len());

        for mut state in self.groups.iter_mut() {
            let group_id = state.group.id();
            let span = info_span!("recompute", timeline = %group_id);
            let _entered = span.enter();

            let group_arrivals: Vec<ArrivalCandidate> = arrivals
                .iter()
                .filter(|(route, candidate)| {
                    state
                        .group
                        .includes_arrival(&candidate.airport_icao, route)
                })
                .map(|(_, candidate)| candidate.clone())
                .collect();
            let group_departures: Vec<DepartureCandidate> = departures
                .iter()
                .filter(|candidate| state.group.includes_departure(&candidate.airport_icao))
                .cloned()
                .collect();

            let events = self.sequencer.sequence(&SequenceInput {
                timeline_group_id: &group_id,
                now,
                arrivals: &group_arrivals,
                departures: &group_departures,
                requested_times: &state.requested_times,
            });

            state.generation += 1;
            let snapshot = Arc::new(TimelineSnapshot {
                timeline_group_id: group_id.clone(),
                generation: state.generation,
                computed_at: now,
                events,
            });
            state.publisher.send_replace(Arc::clone(&snapshot));

            debug!(
                "Published generation {} with {} events",
                snapshot.generation,
                snapshot.events.len()
            );
            metrics::counter!("planner.snapshots_published_total").increment(1);
            metrics::gauge!("planner.timeline_events", "timeline" => group_id)
                .set(snapshot.events.len() as f64);
            published.push(snapshot);
        }

        published.sort_by(|a, b| a.timeline_group_id.cmp(&b.timeline_group_id));
        published
    }

    fn arrival_candidates(&self) -> Vec<(Vec<RawFix>, ArrivalCandidate)> {
        self.arrivals
            .iter()
            .filter_map(|tracked| {
                let (_, estimate) = tracked.estimate.as_ref()?;
                let report = &tracked.report;
                let candidate = ArrivalCandidate {
                    callsign: report.callsign.clone(),
                    icao_type: report.icao_type.clone(),
                    wake_category: report.wake_category,
                    airport_icao: report.arrival_airport_icao.clone(),
                    runway: estimate.runway.clone(),
                    assigned_star: report.assigned_star.clone(),
                    navdata_derived: estimate.navdata_derived,
                    tracking_controller: report.tracking_controller.clone(),
                    flight_level: report.flight_level(),
                    pressure_altitude_ft: report.pressure_altitude_ft,
                    ground_speed_kt: report.ground_speed_kt,
                    registration_order: tracked.registration_order,
                    estimate: estimate.result.clone(),
                };
                Some((report.raw_fixes(), candidate))
            })
            .collect()
    }

    fn departure_candidates(&self) -> Vec<DepartureCandidate> {
        self.departures
            .iter()
            .map(|tracked| {
                let report = &tracked.report;
                DepartureCandidate {
                    callsign: report.callsign.clone(),
                    icao_type: report.icao_type.clone(),
                    wake_category: report.wake_category,
                    airport_icao: report.airport_icao.clone(),
                    runway: report.runway.clone(),
                    sid: report.sid.clone(),
                    tracking_controller: report.tracking_controller.clone(),
                    target_takeoff_time: report.target_takeoff_time,
                    registration_order: tracked.registration_order,
                }
            })
            .collect()
    }

    /// Recompute periodically and hand every snapshot to `sink` until `shutdown` fires
    pub async fn run(
        self: Arc<Self>,
        sink: Arc<dyn TimelineSink>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let mut interval = tokio::time::interval(self.recompute_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(
            "Planner loop started, recomputing every {:?}",
            self.recompute_interval
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Planner received shutdown signal");
                    break;
                }
                _ = interval.tick() => {
                    let snapshots = self.recompute(Utc::now());
                    publish_all(sink.as_ref(), snapshots)
                        .instrument(info_span!("publish"))
                        .await;
                }
            }
        }
    }
}

/// Hand snapshots to a sink, logging failures without stopping
pub async fn publish_all(sink: &dyn TimelineSink, snapshots: Vec<Arc<TimelineSnapshot>>) {
    for snapshot in snapshots {
        let group_id = snapshot.timeline_group_id.clone();
        if let Err(e) = sink.publish(snapshot).await {
            error!("Failed to publish timeline {}: {:#}", group_id, e);
            metrics::counter!("planner.publish_failed_total").increment(1);
        }
    }
}

/// Resolve navigation data and estimate one arrival report.
///
/// Synchronous and free of shared state, so it can run on any thread.
pub fn estimate_arrival(
    airports: &HashMap<String, Airport>,
    performance: &dyn PerformanceLookup,
    weather: &[VerticalWeatherProfile],
    report: &ArrivalReport,
    state_time: DateTime<Utc>,
) -> ArrivalEstimate {
    let Some(runway_id) = report.assigned_runway.clone() else {
        return ArrivalEstimate {
            runway: None,
            navdata_derived: false,
            result: Err(TrajectoryError::NoAssignedRunway(report.callsign.clone())),
        };
    };

    let Some(airport) = airports.get(&report.arrival_airport_icao) else {
        return ArrivalEstimate {
            runway: Some(runway_id),
            navdata_derived: false,
            result: Err(TrajectoryError::Other(format!(
                "no navigation data for {}",
                report.arrival_airport_icao
            ))),
        };
    };

    let star = report
        .assigned_star
        .as_deref()
        .and_then(|star| airport.star(star, Some(&runway_id)));
    let navdata_derived = star.is_some();

    let result = match airport.runway(&runway_id) {
        None => Err(TrajectoryError::Other(format!(
            "unknown runway {} at {}",
            runway_id, airport.icao
        ))),
        Some(threshold) => resolve_remaining_route(&airport.icao, &report.raw_fixes(), star)
            .map_err(TrajectoryError::from)
            .and_then(|route| {
                let state = report.state();
                let input = TrajectoryInput {
                    callsign: &report.callsign,
                    aircraft_type: &report.icao_type,
                    state: &state,
                    route: &route,
                    runway: threshold,
                    star,
                    weather,
                    flight_plan_tas: report.flight_plan_tas_kt.map(f64::from),
                };
                DescentTrajectoryBuilder::new(performance).estimate(&input, state_time)
            }),
    };

    ArrivalEstimate {
        runway: Some(runway_id),
        navdata_derived,
        result,
    }
}
