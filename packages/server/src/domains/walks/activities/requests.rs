//! Owner-side request activities: create, edit, cancel, delete, list.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::validate_price;
use crate::common::utils::GeoPoint;
use crate::common::{Actor, DogId, RequestId};
use crate::domains::walks::errors::{WalkError, WalkResult};
use crate::domains::walks::events::WalkEvent;
use crate::domains::walks::models::{ensure_transition, RequestStatus, WalkRequest};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWalkRequest {
    pub dog_id: DogId,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zone: Option<String>,
    pub notes: Option<String>,
    pub suggested_price: Decimal,
}

/// Partial edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWalkRequest {
    pub scheduled_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zone: Option<String>,
    pub notes: Option<String>,
    pub suggested_price: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Removed outright; nobody had bid on it.
    Deleted,
    /// Offers exist, so the request was kept and cancelled.
    Cancelled,
}

fn normalize(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Field rules shared by create and update.
fn validate_fields(request: &WalkRequest, today: NaiveDate) -> WalkResult<()> {
    if request.scheduled_date < today {
        return Err(WalkError::validation("scheduled_date cannot be in the past"));
    }
    if request.duration_minutes <= 0 {
        return Err(WalkError::validation("duration_minutes must be positive"));
    }
    validate_price("suggested_price", request.suggested_price)?;
    match (request.latitude, request.longitude) {
        (Some(_), None) | (None, Some(_)) => {
            return Err(WalkError::validation(
                "latitude and longitude must be provided together",
            ));
        }
        _ => {}
    }
    if let Some(point) = request.point() {
        if !point.is_valid() {
            return Err(WalkError::validation("coordinates out of range"));
        }
    }
    if request.point().is_none() && request.zone.is_none() {
        return Err(WalkError::validation(
            "either a location point or a zone is required",
        ));
    }
    Ok(())
}

pub async fn create_request(
    actor: &Actor,
    input: CreateWalkRequest,
    deps: &ServerDeps,
) -> WalkResult<WalkRequest> {
    let dog = deps
        .dogs
        .find_dog(input.dog_id)
        .await?
        .ok_or(WalkError::NotFound("Dog"))?;

    if dog.owner_id != actor.member_id {
        return Err(WalkError::forbidden("dog belongs to another owner"));
    }

    let now = deps.clock.now();
    let request = WalkRequest {
        id: RequestId::new(),
        owner_id: actor.member_id,
        dog_id: dog.id,
        dog_size: dog.size,
        scheduled_date: input.scheduled_date,
        start_time: input.start_time,
        duration_minutes: input.duration_minutes,
        latitude: input.latitude,
        longitude: input.longitude,
        zone: normalize(input.zone),
        notes: normalize(input.notes),
        suggested_price: input.suggested_price,
        status: RequestStatus::Open,
        created_at: now,
        updated_at: now,
    };
    validate_fields(&request, deps.clock.today())?;

    let mut tx = deps.store.begin().await?;
    tx.insert_request(&request).await?;
    tx.commit().await?;

    info!(
        request_id = %request.id,
        owner_id = %request.owner_id,
        zone = ?request.zone,
        "Walk request created"
    );
    deps.events.publish(WalkEvent::RequestCreated {
        request_id: request.id,
        owner_id: request.owner_id,
    });

    Ok(request)
}

/// Owners see their own requests in any state; anyone else sees OPEN
/// requests and the ones they are assigned to walk.
pub async fn get_request(
    actor: &Actor,
    request_id: RequestId,
    deps: &ServerDeps,
) -> WalkResult<WalkRequest> {
    let request = deps
        .store
        .find_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;

    if request.owner_id == actor.member_id || request.status == RequestStatus::Open {
        return Ok(request);
    }

    let assigned = deps
        .store
        .find_assignment_for_request(request_id)
        .await?
        .is_some_and(|a| a.walker_id == actor.member_id);
    if assigned {
        Ok(request)
    } else {
        Err(WalkError::forbidden("not a participant in this walk"))
    }
}

pub async fn list_owner_requests(
    actor: &Actor,
    status: Option<RequestStatus>,
    deps: &ServerDeps,
) -> WalkResult<Vec<WalkRequest>> {
    Ok(deps
        .store
        .list_owner_requests(actor.member_id, status)
        .await?)
}

pub async fn update_request(
    actor: &Actor,
    request_id: RequestId,
    patch: UpdateWalkRequest,
    deps: &ServerDeps,
) -> WalkResult<WalkRequest> {
    let mut tx = deps.store.begin().await?;
    let mut request = tx
        .lock_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;

    if request.owner_id != actor.member_id {
        return Err(WalkError::forbidden("only the owner can edit a request"));
    }
    if request.status != RequestStatus::Open {
        return Err(WalkError::NotOpen);
    }

    if let Some(date) = patch.scheduled_date {
        request.scheduled_date = date;
    }
    if let Some(time) = patch.start_time {
        request.start_time = time;
    }
    if let Some(minutes) = patch.duration_minutes {
        request.duration_minutes = minutes;
    }
    if patch.latitude.is_some() || patch.longitude.is_some() {
        request.latitude = patch.latitude;
        request.longitude = patch.longitude;
    }
    if patch.zone.is_some() {
        request.zone = normalize(patch.zone);
    }
    if patch.notes.is_some() {
        request.notes = normalize(patch.notes);
    }
    if let Some(price) = patch.suggested_price {
        request.suggested_price = price;
    }
    validate_fields(&request, deps.clock.today())?;

    request.updated_at = deps.clock.now();
    tx.update_request(&request).await?;
    tx.commit().await?;

    info!(request_id = %request.id, "Walk request updated");
    Ok(request)
}

pub async fn cancel_request(
    actor: &Actor,
    request_id: RequestId,
    deps: &ServerDeps,
) -> WalkResult<WalkRequest> {
    let mut tx = deps.store.begin().await?;
    let mut request = tx
        .lock_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;

    if request.owner_id != actor.member_id {
        return Err(WalkError::forbidden("only the owner can cancel a request"));
    }
    if request.status != RequestStatus::Open {
        return Err(WalkError::NotOpen);
    }
    ensure_transition(request.status, RequestStatus::Cancelled)?;

    let now = deps.clock.now();
    let rejected = tx.reject_pending_offers(request.id, None, now).await?;
    request.status = RequestStatus::Cancelled;
    request.updated_at = now;
    tx.update_request(&request).await?;
    tx.commit().await?;

    info!(
        request_id = %request.id,
        rejected_offers = rejected.len(),
        "Walk request cancelled"
    );
    deps.events.publish(WalkEvent::RequestCancelled {
        request_id: request.id,
        owner_id: request.owner_id,
        rejected_walkers: rejected.iter().map(|o| o.walker_id).collect(),
    });

    Ok(request)
}

/// Physically removes an OPEN request nobody bid on; otherwise cancels it.
pub async fn delete_request(
    actor: &Actor,
    request_id: RequestId,
    deps: &ServerDeps,
) -> WalkResult<DeleteOutcome> {
    let mut tx = deps.store.begin().await?;
    let request = tx
        .lock_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;

    if request.owner_id != actor.member_id {
        return Err(WalkError::forbidden("only the owner can delete a request"));
    }
    if request.status != RequestStatus::Open {
        return Err(WalkError::NotOpen);
    }

    if tx.count_offers(request_id).await? > 0 {
        drop(tx);
        cancel_request(actor, request_id, deps).await?;
        return Ok(DeleteOutcome::Cancelled);
    }

    tx.delete_request(request_id).await?;
    tx.commit().await?;

    info!(request_id = %request_id, "Walk request deleted");
    Ok(DeleteOutcome::Deleted)
}
