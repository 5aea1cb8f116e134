//! Offer ledger endpoints.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};

use crate::common::{OfferId, RequestId};
use crate::domains::walks::activities::{self, SubmitOffer};
use crate::domains::walks::models::{Offer, WalkAssignment};
use crate::domains::walks::WalkError;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

pub async fn submit_offer_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(request_id): Path<RequestId>,
    Json(input): Json<SubmitOffer>,
) -> Result<(StatusCode, Json<Offer>), WalkError> {
    let offer = activities::submit_offer(&user.actor(), request_id, input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

pub async fn list_request_offers_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(request_id): Path<RequestId>,
) -> Result<Json<Vec<Offer>>, WalkError> {
    Ok(Json(
        activities::list_request_offers(&user.actor(), request_id, &state.deps).await?,
    ))
}

pub async fn walker_offers_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Offer>>, WalkError> {
    Ok(Json(
        activities::list_walker_offers(&user.actor(), &state.deps).await?,
    ))
}

/// Returns the assignment created by the acceptance.
pub async fn accept_offer_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(offer_id): Path<OfferId>,
) -> Result<(StatusCode, Json<WalkAssignment>), WalkError> {
    let assignment = activities::accept_offer(&user.actor(), offer_id, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn reject_offer_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(offer_id): Path<OfferId>,
) -> Result<Json<Offer>, WalkError> {
    Ok(Json(
        activities::reject_offer(&user.actor(), offer_id, &state.deps).await?,
    ))
}
