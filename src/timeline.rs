//! Timeline events published to the presentation layer.
//!
//! Events are immutable snapshots: every recompute cycle produces fresh
//! instances and the previous ones are dropped, never patched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::performance::WakeCategory;
use crate::trajectory::DescentSegment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NonSequencedReason {
    MissingPerformanceData,
    NoAssignedRunway,
    EmptyRoute,
    /// Too high to reach the threshold over the remaining route
    ExcessAltitude,
    UnknownError,
}

impl NonSequencedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NonSequencedReason::MissingPerformanceData => "missing_performance_data",
            NonSequencedReason::NoAssignedRunway => "no_assigned_runway",
            NonSequencedReason::EmptyRoute => "empty_route",
            NonSequencedReason::ExcessAltitude => "excess_altitude",
            NonSequencedReason::UnknownError => "unknown_error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SequenceStatus {
    Sequenced,
    NotSequenced(NonSequencedReason),
}

impl SequenceStatus {
    pub fn is_sequenced(&self) -> bool {
        matches!(self, SequenceStatus::Sequenced)
    }

    pub fn reason(&self) -> Option<NonSequencedReason> {
        match self {
            SequenceStatus::Sequenced => None,
            SequenceStatus::NotSequenced(reason) => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayArrivalEvent {
    pub timeline_group_id: String,
    pub callsign: String,
    pub icao_type: String,
    pub wake_category: Option<WakeCategory>,
    pub airport_icao: String,
    pub runway: Option<String>,
    pub tracking_controller: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub estimated_time: Option<DateTime<Utc>>,
    pub assigned_star: Option<String>,
    /// The assigned arrival procedure was found in the navigation data
    pub navdata_derived: bool,
    pub flight_level: i32,
    pub pressure_altitude_ft: i32,
    pub ground_speed_kt: i32,
    pub remaining_distance_nm: Option<f64>,
    pub distance_to_preceding_nm: Option<f64>,
    pub landing_ias_kt: Option<i32>,
    pub descent_trajectory: Vec<DescentSegment>,
    pub within_active_advisory_horizon: bool,
    pub sequence_status: SequenceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayDepartureEvent {
    pub timeline_group_id: String,
    pub callsign: String,
    pub icao_type: String,
    pub wake_category: Option<WakeCategory>,
    pub airport_icao: String,
    pub runway: Option<String>,
    pub sid: Option<String>,
    pub tracking_controller: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub estimated_time: Option<DateTime<Utc>>,
    pub within_active_advisory_horizon: bool,
    pub sequence_status: SequenceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimelineEvent {
    #[serde(rename = "RunwayArrivalEvent")]
    Arrival(RunwayArrivalEvent),
    #[serde(rename = "RunwayDepartureEvent")]
    Departure(RunwayDepartureEvent),
}

impl TimelineEvent {
    pub fn callsign(&self) -> &str {
        match self {
            TimelineEvent::Arrival(event) => &event.callsign,
            TimelineEvent::Departure(event) => &event.callsign,
        }
    }

    pub fn runway(&self) -> Option<&str> {
        match self {
            TimelineEvent::Arrival(event) => event.runway.as_deref(),
            TimelineEvent::Departure(event) => event.runway.as_deref(),
        }
    }

    pub fn scheduled_time(&self) -> Option<DateTime<Utc>> {
        match self {
            TimelineEvent::Arrival(event) => event.scheduled_time,
            TimelineEvent::Departure(event) => event.scheduled_time,
        }
    }

    pub fn estimated_time(&self) -> Option<DateTime<Utc>> {
        match self {
            TimelineEvent::Arrival(event) => event.estimated_time,
            TimelineEvent::Departure(event) => event.estimated_time,
        }
    }

    pub fn wake_category(&self) -> Option<WakeCategory> {
        match self {
            TimelineEvent::Arrival(event) => event.wake_category,
            TimelineEvent::Departure(event) => event.wake_category,
        }
    }

    pub fn sequence_status(&self) -> SequenceStatus {
        match self {
            TimelineEvent::Arrival(event) => event.sequence_status,
            TimelineEvent::Departure(event) => event.sequence_status,
        }
    }

    pub fn is_sequenced(&self) -> bool {
        self.sequence_status().is_sequenced()
    }

    pub fn as_arrival(&self) -> Option<&RunwayArrivalEvent> {
        match self {
            TimelineEvent::Arrival(event) => Some(event),
            TimelineEvent::Departure(_) => None,
        }
    }
}
