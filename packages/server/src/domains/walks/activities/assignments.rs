//! Assignment lifecycle: start, cancel, complete, mark paid, read.
//!
//! Lock order is assignment, then its request.

use anyhow::anyhow;
use chrono::Duration;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tracing::{debug, info};

use super::MONEY_SCALE;
use crate::common::{Actor, AssignmentId, RequestId};
use crate::domains::walks::errors::{WalkError, WalkResult};
use crate::domains::walks::events::WalkEvent;
use crate::domains::walks::models::{
    ensure_transition, AssignmentStatus, CancelParty, FeeStatus, PaymentStatus, RequestStatus,
    WalkAssignment,
};
use crate::kernel::ServerDeps;

/// Post-walk report filed with CompleteAssignment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalkReport {
    pub pee: Option<bool>,
    pub poo: Option<bool>,
    pub behavior_rating: Option<i16>,
    pub notes: Option<String>,
    /// Required when the walk ran shorter than scheduled.
    pub early_end_reason: Option<String>,
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Whole minutes elapsed, rounded down and never negative.
pub fn elapsed_minutes(duration: Duration) -> i32 {
    (duration.num_seconds().max(0) / 60) as i32
}

/// `agreed_price * fee_rate`, rounded half away from zero to whole cents.
pub fn platform_fee(agreed_price: Decimal, fee_rate: Decimal) -> Decimal {
    (agreed_price * fee_rate).round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub async fn get_assignment(
    actor: &Actor,
    assignment_id: AssignmentId,
    deps: &ServerDeps,
) -> WalkResult<WalkAssignment> {
    let assignment = deps
        .store
        .find_assignment(assignment_id)
        .await?
        .ok_or(WalkError::NotFound("Assignment"))?;

    if !assignment.is_participant(actor.member_id) {
        return Err(WalkError::forbidden("not a participant in this walk"));
    }
    Ok(assignment)
}

pub async fn get_assignment_for_request(
    actor: &Actor,
    request_id: RequestId,
    deps: &ServerDeps,
) -> WalkResult<WalkAssignment> {
    let assignment = deps
        .store
        .find_assignment_for_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Assignment"))?;

    if !assignment.is_participant(actor.member_id) {
        return Err(WalkError::forbidden("not a participant in this walk"));
    }
    Ok(assignment)
}

pub async fn start_assignment(
    actor: &Actor,
    assignment_id: AssignmentId,
    deps: &ServerDeps,
) -> WalkResult<WalkAssignment> {
    let mut tx = deps.store.begin().await?;
    let mut assignment = tx
        .lock_assignment(assignment_id)
        .await?
        .ok_or(WalkError::NotFound("Assignment"))?;

    if assignment.walker_id != actor.member_id {
        return Err(WalkError::forbidden("only the assigned walker can start the walk"));
    }
    ensure_transition(assignment.status, AssignmentStatus::InProgress)?;

    let mut request = tx
        .lock_request(assignment.request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;
    ensure_transition(request.status, RequestStatus::InProgress)?;

    let now = deps.clock.now();
    assignment.status = AssignmentStatus::InProgress;
    assignment.actual_start_time = Some(now);
    assignment.updated_at = now;
    request.status = RequestStatus::InProgress;
    request.updated_at = now;

    tx.update_assignment(&assignment).await?;
    tx.update_request(&request).await?;
    tx.commit().await?;

    info!(assignment_id = %assignment.id, walker_id = %assignment.walker_id, "Walk started");
    deps.events.publish(WalkEvent::WalkStarted {
        assignment_id: assignment.id,
        owner_id: assignment.owner_id,
        walker_id: assignment.walker_id,
        started_at: now,
    });

    Ok(assignment)
}

/// Either party may cancel a PENDING or IN_PROGRESS walk; the request is
/// cancelled with it.
pub async fn cancel_assignment(
    actor: &Actor,
    assignment_id: AssignmentId,
    reason: &str,
    deps: &ServerDeps,
) -> WalkResult<WalkAssignment> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(WalkError::validation("a cancellation reason is required"));
    }

    let mut tx = deps.store.begin().await?;
    let mut assignment = tx
        .lock_assignment(assignment_id)
        .await?
        .ok_or(WalkError::NotFound("Assignment"))?;

    let party = if actor.member_id == assignment.walker_id {
        CancelParty::Walker
    } else if actor.member_id == assignment.owner_id {
        CancelParty::Owner
    } else {
        return Err(WalkError::forbidden("not a participant in this walk"));
    };
    ensure_transition(assignment.status, AssignmentStatus::Cancelled)?;

    let mut request = tx
        .lock_request(assignment.request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;
    ensure_transition(request.status, RequestStatus::Cancelled)?;

    let now = deps.clock.now();
    assignment.status = AssignmentStatus::Cancelled;
    assignment.cancelled_by = Some(party);
    assignment.cancelled_by_id = Some(actor.member_id);
    assignment.cancel_reason = Some(reason.to_string());
    assignment.cancelled_at = Some(now);
    assignment.updated_at = now;
    request.status = RequestStatus::Cancelled;
    request.updated_at = now;

    tx.update_assignment(&assignment).await?;
    tx.update_request(&request).await?;
    tx.commit().await?;

    deps.tracking.end(assignment.id).await;

    info!(
        assignment_id = %assignment.id,
        cancelled_by = ?party,
        "Walk cancelled"
    );
    deps.events.publish(WalkEvent::WalkCancelled {
        assignment_id: assignment.id,
        owner_id: assignment.owner_id,
        walker_id: assignment.walker_id,
        cancelled_by: party,
        reason: reason.to_string(),
    });

    Ok(assignment)
}

/// Finishes the walk, files the report and fixes the platform fee at
/// `agreed_price * fee_rate`.
pub async fn complete_assignment(
    actor: &Actor,
    assignment_id: AssignmentId,
    report: WalkReport,
    deps: &ServerDeps,
) -> WalkResult<WalkAssignment> {
    if let Some(rating) = report.behavior_rating {
        if !(1..=5).contains(&rating) {
            return Err(WalkError::validation("behavior_rating must be between 1 and 5"));
        }
    }

    let mut tx = deps.store.begin().await?;
    let mut assignment = tx
        .lock_assignment(assignment_id)
        .await?
        .ok_or(WalkError::NotFound("Assignment"))?;

    if assignment.walker_id != actor.member_id {
        return Err(WalkError::forbidden("only the assigned walker can complete the walk"));
    }
    ensure_transition(assignment.status, AssignmentStatus::Completed)?;

    let mut request = tx
        .lock_request(assignment.request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;
    ensure_transition(request.status, RequestStatus::Completed)?;

    let started_at = assignment
        .actual_start_time
        .ok_or_else(|| anyhow!("assignment {} is in progress without a start time", assignment.id))?;

    let now = deps.clock.now();
    let duration_minutes = elapsed_minutes(now - started_at);

    let early_end_reason = if duration_minutes < request.duration_minutes {
        let reason = non_blank(report.early_end_reason).ok_or_else(|| {
            WalkError::validation(format!(
                "walk lasted {duration_minutes} of {} scheduled minutes; early_end_reason is required",
                request.duration_minutes
            ))
        })?;
        Some(reason)
    } else {
        None
    };

    let fee_rate = deps.platform_fee_rate;
    let fee_amount = platform_fee(assignment.agreed_price, fee_rate);

    assignment.status = AssignmentStatus::Completed;
    assignment.actual_end_time = Some(now);
    assignment.actual_duration_minutes = Some(duration_minutes);
    assignment.pee = report.pee;
    assignment.poo = report.poo;
    assignment.behavior_rating = report.behavior_rating;
    assignment.report_notes = non_blank(report.notes);
    assignment.early_end_reason = early_end_reason;
    assignment.platform_fee_rate = Some(fee_rate);
    assignment.platform_fee_amount = Some(fee_amount);
    assignment.platform_fee_status = Some(FeeStatus::Due);
    assignment.updated_at = now;
    request.status = RequestStatus::Completed;
    request.updated_at = now;

    tx.update_assignment(&assignment).await?;
    tx.update_request(&request).await?;
    tx.commit().await?;

    if deps.tracking.end(assignment.id).await {
        debug!(assignment_id = %assignment.id, "Tracking session closed");
    }

    info!(
        assignment_id = %assignment.id,
        duration_minutes,
        platform_fee = %fee_amount,
        "Walk completed"
    );
    deps.events.publish(WalkEvent::WalkCompleted {
        assignment_id: assignment.id,
        owner_id: assignment.owner_id,
        walker_id: assignment.walker_id,
        duration_minutes,
        platform_fee_amount: fee_amount,
    });

    Ok(assignment)
}

/// Owner confirms they paid the walker. Bookkeeping only.
pub async fn mark_paid(
    actor: &Actor,
    assignment_id: AssignmentId,
    deps: &ServerDeps,
) -> WalkResult<WalkAssignment> {
    let mut tx = deps.store.begin().await?;
    let mut assignment = tx
        .lock_assignment(assignment_id)
        .await?
        .ok_or(WalkError::NotFound("Assignment"))?;

    if assignment.owner_id != actor.member_id {
        return Err(WalkError::forbidden("only the owner can mark a walk paid"));
    }
    if assignment.status != AssignmentStatus::Completed {
        return Err(WalkError::NotCompleted(assignment.status.to_string()));
    }
    if assignment.payment_status == PaymentStatus::Paid {
        return Err(WalkError::AlreadyPaid);
    }

    let now = deps.clock.now();
    assignment.payment_status = PaymentStatus::Paid;
    assignment.paid_at = Some(now);
    assignment.updated_at = now;
    tx.update_assignment(&assignment).await?;
    tx.commit().await?;

    info!(assignment_id = %assignment.id, "Walk marked paid");
    deps.events.publish(WalkEvent::PaymentMarked {
        assignment_id: assignment.id,
        owner_id: assignment.owner_id,
        walker_id: assignment.walker_id,
    });

    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_minutes_rounds_down() {
        assert_eq!(elapsed_minutes(Duration::seconds(35 * 60)), 35);
        assert_eq!(elapsed_minutes(Duration::seconds(29 * 60 + 59)), 29);
        assert_eq!(elapsed_minutes(Duration::seconds(-5)), 0);
    }

    #[test]
    fn platform_fee_is_rounded_to_cents() {
        let rate = Decimal::new(10, 2);
        assert_eq!(platform_fee(Decimal::from(140), rate), Decimal::from(14));
        assert_eq!(platform_fee(Decimal::new(14055, 2), rate), Decimal::new(1406, 2));
        assert_eq!(platform_fee(Decimal::new(14099, 2), Decimal::new(1250, 4)), Decimal::new(1762, 2));
        assert!(platform_fee(Decimal::new(9999, 2), Decimal::new(333, 4)).scale() <= MONEY_SCALE);
    }
}
