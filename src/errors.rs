use thiserror::Error;

use crate::timeline::NonSequencedReason;
use crate::trajectory::DescentSegment;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error("empty route: {0}")]
    EmptyRoute(String),
}

/// Why a trajectory could not be estimated for one aircraft.
///
/// None of these abort a recompute cycle; each becomes a non-sequenced
/// timeline event for the affected aircraft.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("empty route: {0}")]
    EmptyRoute(String),

    #[error("unknown aircraft type: {0}")]
    UnknownAircraftType(String),

    #[error("empty trajectory: {0}")]
    EmptyTrajectory(String),

    /// The aircraft cannot lose enough altitude before the threshold.
    /// The best-effort trajectory is kept for display.
    #[error("reached end of route: {message}")]
    ReachedEndOfRoute {
        message: String,
        best_effort: Vec<DescentSegment>,
    },

    #[error("no assigned runway: {0}")]
    NoAssignedRunway(String),

    #[error("{0}")]
    Other(String),
}

impl TrajectoryError {
    pub fn non_sequenced_reason(&self) -> NonSequencedReason {
        match self {
            TrajectoryError::EmptyRoute(_) | TrajectoryError::EmptyTrajectory(_) => {
                NonSequencedReason::EmptyRoute
            }
            TrajectoryError::UnknownAircraftType(_) => NonSequencedReason::MissingPerformanceData,
            TrajectoryError::ReachedEndOfRoute { .. } => NonSequencedReason::ExcessAltitude,
            TrajectoryError::NoAssignedRunway(_) => NonSequencedReason::NoAssignedRunway,
            TrajectoryError::Other(_) => NonSequencedReason::UnknownError,
        }
    }

    /// Trajectory that can still be shown even though estimation failed
    pub fn best_effort_trajectory(&self) -> Option<&[DescentSegment]> {
        match self {
            TrajectoryError::ReachedEndOfRoute { best_effort, .. } => Some(best_effort),
            _ => None,
        }
    }
}

impl From<RouteError> for TrajectoryError {
    fn from(error: RouteError) -> Self {
        match error {
            RouteError::EmptyRoute(message) => TrajectoryError::EmptyRoute(message),
        }
    }
}
