use serde::Serialize;
use tracing::{debug, warn};

use super::session::{Disposition, LocationSample, SampleOutcome};
use crate::common::utils::{distance_meters, GeoPoint};
use crate::common::{Actor, AssignmentId};
use crate::domains::walks::errors::{WalkError, WalkResult};
use crate::domains::walks::models::{AssignmentStatus, RoutePoint};
use crate::kernel::ServerDeps;

/// A persisted route plus totals derived on read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub assignment_id: AssignmentId,
    pub point_count: usize,
    pub total_distance_meters: f64,
    pub points: Vec<RoutePoint>,
    /// Accepted samples still waiting for the next persist. Only filled
    /// while the walk is in progress.
    pub buffered_points: Vec<GeoPoint>,
}

impl RouteSummary {
    pub fn from_points(assignment_id: AssignmentId, points: Vec<RoutePoint>) -> Self {
        let total_distance_meters = points
            .windows(2)
            .map(|pair| distance_meters(pair[0].point(), pair[1].point()))
            .sum();
        Self {
            assignment_id,
            point_count: points.len(),
            total_distance_meters,
            points,
            buffered_points: Vec::new(),
        }
    }
}

/// Ingests one location sample from the assigned walker.
///
/// Rejected and discarded samples are not errors; the outcome says what
/// happened. Persisting a point also pushes the walker's last-known location
/// to the directory, and a failure there is only logged.
pub async fn record_location(
    actor: &Actor,
    assignment_id: AssignmentId,
    sample: LocationSample,
    deps: &ServerDeps,
) -> WalkResult<SampleOutcome> {
    let assignment = deps
        .store
        .find_assignment(assignment_id)
        .await?
        .ok_or(WalkError::NotFound("Assignment"))?;

    if assignment.walker_id != actor.member_id {
        return Err(WalkError::forbidden("only the assigned walker can report locations"));
    }
    if assignment.status != AssignmentStatus::InProgress {
        return Err(WalkError::AssignmentNotTrackable(assignment.status.to_string()));
    }
    sample.validate().map_err(WalkError::validation)?;

    let seed = if deps.tracking.is_active(assignment_id).await {
        None
    } else {
        deps.store.last_route_point(assignment_id).await?
    };

    let now = deps.clock.now();
    let Some(outcome) = deps
        .tracking
        .evaluate(assignment_id, seed.as_ref(), &sample, now)
        .await
    else {
        debug!(assignment_id = %assignment_id, "Sample arrived after tracking closed");
        let status = deps
            .store
            .find_assignment(assignment_id)
            .await?
            .map_or(assignment.status, |current| current.status);
        return Err(WalkError::AssignmentNotTrackable(status.to_string()));
    };

    debug!(
        assignment_id = %assignment_id,
        accuracy = sample.accuracy_meters,
        quality = ?outcome.quality,
        disposition = ?outcome.disposition,
        step_meters = ?outcome.step_meters,
        "Location sample evaluated"
    );

    if outcome.disposition == Disposition::Persisted {
        let point = RoutePoint::new(
            assignment_id,
            sample.point(),
            sample.accuracy_meters,
            sample.recorded_at,
        );
        deps.store.append_route_point(&point).await?;

        if let Err(e) = deps
            .directory
            .update_last_location(assignment.walker_id, sample.point(), sample.recorded_at)
            .await
        {
            warn!(
                error = %e,
                walker_id = %assignment.walker_id,
                "Failed to update walker last location"
            );
        }
    }

    Ok(outcome)
}

/// The persisted route, oldest point first, plus any points buffered by the
/// throttle. Owner or walker only.
pub async fn get_route(
    actor: &Actor,
    assignment_id: AssignmentId,
    deps: &ServerDeps,
) -> WalkResult<RouteSummary> {
    let assignment = deps
        .store
        .find_assignment(assignment_id)
        .await?
        .ok_or(WalkError::NotFound("Assignment"))?;

    if !assignment.is_participant(actor.member_id) {
        return Err(WalkError::forbidden("not a participant in this walk"));
    }

    let points = deps.store.route_points(assignment_id).await?;
    let mut summary = RouteSummary::from_points(assignment_id, points);
    if assignment.status == AssignmentStatus::InProgress {
        summary.buffered_points = deps.tracking.buffered_points(assignment_id).await;
    }
    Ok(summary)
}
