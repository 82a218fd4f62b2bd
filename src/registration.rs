//! Timeline registrations and group membership.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::route::RawFix;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("invalid ICAO airport code: '{0}'")]
    InvalidIcao(String),

    #[error("inbound timeline {0} needs at least one destination airport")]
    NoDestination(u32),

    #[error("empty fix name in timeline {0}")]
    EmptyFix(u32),

    #[error("timeline {0} is not registered")]
    UnknownTimeline(u32),
}

/// Request from the presentation layer to open or close a timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimelineRegistration {
    #[serde(rename = "requestInboundsForFix", rename_all = "camelCase")]
    InboundsForFix {
        request_id: u32,
        #[serde(default)]
        target_fixes: Vec<String>,
        #[serde(default)]
        via_fixes: Vec<String>,
        destination_airports: Vec<String>,
    },

    #[serde(rename = "requestOutbounds", rename_all = "camelCase")]
    Outbounds { request_id: u32, airport_icao: String },

    #[serde(rename = "unregisterTimeline", rename_all = "camelCase")]
    Unregister { request_id: u32 },
}

impl TimelineRegistration {
    pub fn request_id(&self) -> u32 {
        match self {
            TimelineRegistration::InboundsForFix { request_id, .. }
            | TimelineRegistration::Outbounds { request_id, .. }
            | TimelineRegistration::Unregister { request_id } => *request_id,
        }
    }

    pub fn validate(&self) -> Result<(), RegistrationError> {
        match self {
            TimelineRegistration::InboundsForFix {
                request_id,
                target_fixes,
                via_fixes,
                destination_airports,
            } => {
                if destination_airports.is_empty() {
                    return Err(RegistrationError::NoDestination(*request_id));
                }
                for icao in destination_airports {
                    validate_icao(icao)?;
                }
                if target_fixes
                    .iter()
                    .chain(via_fixes)
                    .any(|fix| fix.trim().is_empty())
                {
                    return Err(RegistrationError::EmptyFix(*request_id));
                }
                Ok(())
            }
            TimelineRegistration::Outbounds { airport_icao, .. } => validate_icao(airport_icao),
            TimelineRegistration::Unregister { .. } => Ok(()),
        }
    }
}

/// ICAO location indicators are four ASCII letters or digits
pub fn validate_icao(icao: &str) -> Result<(), RegistrationError> {
    if icao.len() == 4 && icao.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(RegistrationError::InvalidIcao(icao.to_string()))
    }
}

/// Which aircraft a registered timeline shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupFilter {
    Inbound {
        target_fixes: Vec<String>,
        via_fixes: Vec<String>,
        destination_airports: Vec<String>,
    },
    Outbound {
        airport_icao: String,
    },
}

/// A registered timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineGroup {
    pub request_id: u32,
    pub filter: GroupFilter,
}

impl TimelineGroup {
    /// Build a group from a validated registration. Unregister requests have no group.
    pub fn from_registration(
        registration: &TimelineRegistration,
    ) -> Result<Option<Self>, RegistrationError> {
        registration.validate()?;
        let group = match registration {
            TimelineRegistration::InboundsForFix {
                request_id,
                target_fixes,
                via_fixes,
                destination_airports,
            } => Some(TimelineGroup {
                request_id: *request_id,
                filter: GroupFilter::Inbound {
                    target_fixes: target_fixes.clone(),
                    via_fixes: via_fixes.clone(),
                    destination_airports: destination_airports.clone(),
                },
            }),
            TimelineRegistration::Outbounds {
                request_id,
                airport_icao,
            } => Some(TimelineGroup {
                request_id: *request_id,
                filter: GroupFilter::Outbound {
                    airport_icao: airport_icao.clone(),
                },
            }),
            TimelineRegistration::Unregister { .. } => None,
        };
        Ok(group)
    }

    pub fn id(&self) -> String {
        self.request_id.to_string()
    }

    /// An arrival belongs to an inbound timeline when it is headed for one of
    /// its destinations and, if fixes are listed, its route contains one of them
    pub fn includes_arrival(&self, destination_icao: &str, route: &[RawFix]) -> bool {
        let GroupFilter::Inbound {
            target_fixes,
            via_fixes,
            destination_airports,
        } = &self.filter
        else {
            return false;
        };

        if !destination_airports.iter().any(|icao| icao == destination_icao) {
            return false;
        }
        if target_fixes.is_empty() && via_fixes.is_empty() {
            return true;
        }
        route.iter().any(|fix| {
            target_fixes
                .iter()
                .chain(via_fixes)
                .any(|wanted| *wanted == fix.id)
        })
    }

    pub fn includes_departure(&self, departure_icao: &str) -> bool {
        matches!(&self.filter, GroupFilter::Outbound { airport_icao } if airport_icao == departure_icao)
    }
}
