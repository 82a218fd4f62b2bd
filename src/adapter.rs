//! Structured messages exchanged with the ATC client and the presentation layer.
//!
//! The engine never touches sockets. Whatever carries these messages parses
//! them into [`MessageFromAtcClient`] and hands published
//! [`TimelineSnapshot`]s to a [`TimelineSink`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::geo::GeoPoint;
use crate::performance::WakeCategory;
use crate::registration::TimelineRegistration;
use crate::route::RawFix;
use crate::timeline::TimelineEvent;
use crate::trajectory::AircraftState;
use crate::weather::VerticalWeatherProfile;

/// A route fix as sent by the ATC client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixPointReport {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub is_passed: bool,
}

/// Live state of one inbound aircraft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalReport {
    pub callsign: String,
    pub icao_type: String,
    #[serde(default)]
    pub wake_category: Option<WakeCategory>,
    pub arrival_airport_icao: String,
    #[serde(default)]
    pub assigned_runway: Option<String>,
    #[serde(default)]
    pub assigned_star: Option<String>,
    #[serde(default)]
    pub assigned_direct: Option<String>,
    #[serde(default)]
    pub tracking_controller: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_ft: i32,
    pub pressure_altitude_ft: i32,
    pub ground_speed_kt: i32,
    pub track_deg: i32,
    #[serde(default)]
    pub route: Vec<FixPointReport>,
    #[serde(default)]
    pub flight_plan_tas_kt: Option<i32>,
}

impl ArrivalReport {
    pub fn state(&self) -> AircraftState {
        AircraftState {
            position: GeoPoint::new(self.latitude, self.longitude),
            altitude_ft: f64::from(self.altitude_ft),
            ground_speed_kt: f64::from(self.ground_speed_kt),
            track_deg: f64::from(self.track_deg),
        }
    }

    /// Route fixes, starting at the direct-to fix when one is assigned
    pub fn raw_fixes(&self) -> Vec<RawFix> {
        let direct_index = self
            .assigned_direct
            .as_deref()
            .and_then(|direct| self.route.iter().position(|fix| fix.name == direct));

        self.route
            .iter()
            .enumerate()
            .map(|(index, fix)| {
                let skipped = direct_index.is_some_and(|direct| index < direct);
                RawFix::new(
                    fix.name.clone(),
                    GeoPoint::new(fix.latitude, fix.longitude),
                    fix.is_passed || skipped,
                )
            })
            .collect()
    }

    pub fn flight_level(&self) -> i32 {
        (f64::from(self.pressure_altitude_ft) / 100.0).round() as i32
    }
}

/// One departure as planned by the ATC client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureReport {
    pub callsign: String,
    pub icao_type: String,
    #[serde(default)]
    pub wake_category: Option<WakeCategory>,
    pub airport_icao: String,
    #[serde(default)]
    pub runway: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub tracking_controller: Option<String>,
    /// Calculated or target take-off time
    #[serde(default)]
    pub target_takeoff_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageFromAtcClient {
    Arrivals {
        inbounds: Vec<ArrivalReport>,
    },
    Departures {
        outbounds: Vec<DepartureReport>,
    },
    Weather {
        profiles: Vec<VerticalWeatherProfile>,
    },
    Timeline {
        registration: TimelineRegistration,
    },
    #[serde(rename_all = "camelCase")]
    SuggestScheduledTime {
        request_id: u32,
        callsign: String,
        scheduled_time: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveFromSequence {
        request_id: u32,
        callsign: String,
    },
}

impl MessageFromAtcClient {
    pub fn parse_line(line: &str) -> Result<Self> {
        serde_json::from_str(line).with_context(|| {
            let preview: String = line.chars().take(80).collect();
            format!("Failed to parse ATC client message: {}", preview)
        })
    }
}

/// A complete timeline for one group, replaced wholesale on every cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSnapshot {
    pub timeline_group_id: String,
    pub generation: u64,
    pub computed_at: DateTime<Utc>,
    pub events: Vec<TimelineEvent>,
}

impl TimelineSnapshot {
    pub fn empty(timeline_group_id: impl Into<String>, computed_at: DateTime<Utc>) -> Self {
        Self {
            timeline_group_id: timeline_group_id.into(),
            generation: 0,
            computed_at,
            events: Vec::new(),
        }
    }
}

/// Consumer of published timelines
#[async_trait]
pub trait TimelineSink: Send + Sync {
    /// Deliver a freshly computed timeline
    ///
    /// # Arguments
    ///
    /// * `snapshot` - The complete timeline for one group
    async fn publish(&self, snapshot: Arc<TimelineSnapshot>) -> Result<()>;
}

/// Writes each snapshot as one JSON line
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> TimelineSink for JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn publish(&self, snapshot: Arc<TimelineSnapshot>) -> Result<()> {
        let mut line = serde_json::to_vec(snapshot.as_ref())
            .context("Failed to serialize timeline snapshot")?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .context("Failed to write timeline snapshot")?;
        writer.flush().await.context("Failed to flush timeline output")?;
        Ok(())
    }
}
