use axum::{
    extract::{Extension, Query},
    Json,
};

use crate::domains::settlement::{self, EarningsQuery, WalkerEarnings};
use crate::domains::walks::WalkError;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

/// `GET /walker/payments?from=&to=&only_pending=&first=&after=`
pub async fn walker_payments_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<EarningsQuery>,
) -> Result<Json<WalkerEarnings>, WalkError> {
    Ok(Json(
        settlement::walker_earnings(&user.actor(), query, &state.deps).await?,
    ))
}
