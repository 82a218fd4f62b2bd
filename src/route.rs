use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::RouteError;
use crate::geo::GeoPoint;
use crate::navdata::ArrivalProcedure;

/// A route fix as reported by the flight data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFix {
    pub id: String,
    pub position: GeoPoint,
    #[serde(default)]
    pub passed: bool,
}

impl RawFix {
    pub fn new(id: impl Into<String>, position: GeoPoint, passed: bool) -> Self {
        Self {
            id: id.into(),
            position,
            passed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub id: String,
    pub position: GeoPoint,
    pub is_passed: bool,
    pub is_on_star: bool,
}

/// Route from the aircraft's current position to its destination, in flight order.
///
/// Passed flags are monotonic: every point before a passed point is passed too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingRoute {
    pub arrival_airport_icao: String,
    pub points: Vec<RoutePoint>,
}

impl RemainingRoute {
    /// Points not yet flown over, in flight order
    pub fn upcoming(&self) -> &[RoutePoint] {
        let first_unpassed = self
            .points
            .iter()
            .position(|point| !point.is_passed)
            .unwrap_or(self.points.len());
        &self.points[first_unpassed..]
    }
}

/// Build the remaining route from raw fixes and an optional matched arrival procedure.
///
/// The arrival airport's own identifier is dropped from the fixes. Passed flags
/// are back-filled so that a passed fix implies all earlier fixes are passed.
pub fn resolve_remaining_route(
    arrival_airport_icao: &str,
    raw_fixes: &[RawFix],
    procedure: Option<&ArrivalProcedure>,
) -> Result<RemainingRoute, RouteError> {
    let fixes: Vec<&RawFix> = raw_fixes
        .iter()
        .filter(|fix| fix.id != arrival_airport_icao)
        .collect();

    if fixes.is_empty() {
        return Err(RouteError::EmptyRoute(format!(
            "no route fixes towards {}",
            arrival_airport_icao
        )));
    }

    let last_passed = fixes.iter().rposition(|fix| fix.passed);
    if let Some(last_passed) = last_passed
        && fixes[..last_passed].iter().any(|fix| !fix.passed)
    {
        debug!(
            "Back-filling passed flags up to {} on route to {}",
            fixes[last_passed].id, arrival_airport_icao
        );
    }

    let points = fixes
        .iter()
        .enumerate()
        .map(|(index, fix)| RoutePoint {
            id: fix.id.clone(),
            position: fix.position,
            is_passed: last_passed.is_some_and(|last| index <= last),
            is_on_star: procedure.is_some_and(|star| star.contains(&fix.id)),
        })
        .collect();

    Ok(RemainingRoute {
        arrival_airport_icao: arrival_airport_icao.to_string(),
        points,
    })
}

/// Along-route distance between two indices of `points`
fn distance_along(points: &[RoutePoint], from: usize, to: usize) -> f64 {
    let (start, end) = if from <= to { (from, to) } else { (to, from) };
    points[start..=end]
        .windows(2)
        .map(|pair| pair[0].position.distance_nm(&pair[1].position))
        .sum()
}

/// IAS normally flown at `points[index]` according to the arrival procedure.
///
/// A fix with its own typical speed returns it directly. Otherwise the speed is
/// interpolated by along-route distance between the nearest earlier and later
/// fixes that carry one. With only an earlier speed that speed is kept; with
/// no earlier speed there is no expectation.
pub fn speed_expectation(
    points: &[RoutePoint],
    index: usize,
    procedure: &ArrivalProcedure,
) -> Option<f64> {
    let speed_at = |i: usize| {
        procedure
            .fix(&points[i].id)
            .and_then(|fix| fix.typical_ias_kt)
    };

    let point = points.get(index)?;
    if let Some(exact) = procedure.fix(&point.id).and_then(|fix| fix.typical_ias_kt) {
        return Some(exact);
    }

    let later = (index..points.len()).find_map(|i| speed_at(i).map(|speed| (i, speed)));
    let earlier = (0..index)
        .rev()
        .find_map(|i| speed_at(i).map(|speed| (i, speed)));

    match (earlier, later) {
        (earlier, None) => earlier.map(|(_, speed)| speed),
        (None, Some(_)) => None,
        (Some((earlier_index, earlier_speed)), Some((later_index, later_speed))) => {
            let to_later = distance_along(points, index, later_index);
            let to_earlier = distance_along(points, index, earlier_index);
            let total = to_later + to_earlier;
            if total <= f64::EPSILON {
                return Some(earlier_speed);
            }
            let ratio = to_later / total;
            Some(earlier_speed * ratio + later_speed * (1.0 - ratio))
        }
    }
}
