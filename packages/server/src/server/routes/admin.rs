//! Operator-only endpoints.

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::common::AssignmentId;
use crate::domains::settlement;
use crate::domains::walks::WalkError;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct SettleFeesBody {
    pub assignment_ids: Vec<AssignmentId>,
}

#[derive(Debug, Serialize)]
pub struct SettleFeesResponse {
    pub settled: usize,
}

pub async fn settle_fees_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(body): Json<SettleFeesBody>,
) -> Result<Json<SettleFeesResponse>, WalkError> {
    let settled = settlement::settle_fees(&user.actor(), body.assignment_ids, &state.deps).await?;
    Ok(Json(SettleFeesResponse { settled }))
}
