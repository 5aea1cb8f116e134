//! Assignment lifecycle endpoints.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;

use crate::common::{AssignmentId, RequestId};
use crate::domains::walks::activities::{self, WalkReport};
use crate::domains::walks::models::WalkAssignment;
use crate::domains::walks::WalkError;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
    #[serde(default)]
    pub reason: String,
}

pub async fn get_assignment_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<AssignmentId>,
) -> Result<Json<WalkAssignment>, WalkError> {
    Ok(Json(
        activities::get_assignment(&user.actor(), id, &state.deps).await?,
    ))
}

pub async fn request_assignment_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(request_id): Path<RequestId>,
) -> Result<Json<WalkAssignment>, WalkError> {
    Ok(Json(
        activities::get_assignment_for_request(&user.actor(), request_id, &state.deps).await?,
    ))
}

pub async fn start_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<AssignmentId>,
) -> Result<Json<WalkAssignment>, WalkError> {
    Ok(Json(
        activities::start_assignment(&user.actor(), id, &state.deps).await?,
    ))
}

pub async fn cancel_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<AssignmentId>,
    Json(body): Json<CancelBody>,
) -> Result<Json<WalkAssignment>, WalkError> {
    Ok(Json(
        activities::cancel_assignment(&user.actor(), id, &body.reason, &state.deps).await?,
    ))
}

pub async fn complete_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<AssignmentId>,
    Json(report): Json<WalkReport>,
) -> Result<Json<WalkAssignment>, WalkError> {
    Ok(Json(
        activities::complete_assignment(&user.actor(), id, report, &state.deps).await?,
    ))
}

pub async fn mark_paid_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<AssignmentId>,
) -> Result<Json<WalkAssignment>, WalkError> {
    Ok(Json(activities::mark_paid(&user.actor(), id, &state.deps).await?))
}
