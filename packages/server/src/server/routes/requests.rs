//! Walk request endpoints.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::RequestId;
use crate::domains::matching::{self, VisibleRequest, VisibleRequestQuery};
use crate::domains::walks::activities::{self, CreateWalkRequest, DeleteOutcome, UpdateWalkRequest};
use crate::domains::walks::models::{RequestStatus, WalkRequest};
use crate::domains::walks::WalkError;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Default, Deserialize)]
pub struct OwnerRequestsQuery {
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub outcome: DeleteOutcome,
}

pub async fn create_request_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(input): Json<CreateWalkRequest>,
) -> Result<(StatusCode, Json<WalkRequest>), WalkError> {
    let request = activities::create_request(&user.actor(), input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_requests_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<OwnerRequestsQuery>,
) -> Result<Json<Vec<WalkRequest>>, WalkError> {
    let requests = activities::list_owner_requests(&user.actor(), query.status, &state.deps).await?;
    Ok(Json(requests))
}

pub async fn get_request_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<WalkRequest>, WalkError> {
    Ok(Json(activities::get_request(&user.actor(), id, &state.deps).await?))
}

pub async fn update_request_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<RequestId>,
    Json(patch): Json<UpdateWalkRequest>,
) -> Result<Json<WalkRequest>, WalkError> {
    Ok(Json(
        activities::update_request(&user.actor(), id, patch, &state.deps).await?,
    ))
}

pub async fn cancel_request_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<WalkRequest>, WalkError> {
    Ok(Json(
        activities::cancel_request(&user.actor(), id, &state.deps).await?,
    ))
}

pub async fn delete_request_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<DeleteResponse>, WalkError> {
    let outcome = activities::delete_request(&user.actor(), id, &state.deps).await?;
    Ok(Json(DeleteResponse { outcome }))
}

/// Walker feed: `GET /walker/requests?search=&dog_size=`
pub async fn visible_requests_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<VisibleRequestQuery>,
) -> Result<Json<Vec<VisibleRequest>>, WalkError> {
    Ok(Json(
        matching::list_visible_requests(&user.actor(), query, &state.deps).await?,
    ))
}
