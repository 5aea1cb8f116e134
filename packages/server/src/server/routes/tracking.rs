//! Live location ingestion and route reads.

use axum::{
    extract::{Extension, Path},
    Json,
};

use crate::common::AssignmentId;
use crate::domains::tracking::{self, LocationSample, RouteSummary, SampleOutcome};
use crate::domains::walks::WalkError;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

/// Always answers with the sample's disposition, persisted or not.
pub async fn record_location_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<AssignmentId>,
    Json(sample): Json<LocationSample>,
) -> Result<Json<SampleOutcome>, WalkError> {
    Ok(Json(
        tracking::record_location(&user.actor(), id, sample, &state.deps).await?,
    ))
}

pub async fn route_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<AssignmentId>,
) -> Result<Json<RouteSummary>, WalkError> {
    Ok(Json(tracking::get_route(&user.actor(), id, &state.deps).await?))
}
