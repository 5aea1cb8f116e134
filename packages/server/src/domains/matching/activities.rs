use serde::Deserialize;
use tracing::debug;

use super::filter::{filter_visible, rule_for, VisibleRequest};
use crate::common::{Actor, Role};
use crate::domains::walks::errors::WalkResult;
use crate::domains::walks::models::DogSize;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisibleRequestQuery {
    pub search: Option<String>,
    pub dog_size: Option<DogSize>,
}

/// Open requests the calling walker may bid on, soonest first.
pub async fn list_visible_requests(
    actor: &Actor,
    query: VisibleRequestQuery,
    deps: &ServerDeps,
) -> WalkResult<Vec<VisibleRequest>> {
    actor.require(Role::Walker)?;

    let prefs = deps.directory.walker_preferences(actor.member_id).await?;
    let today = deps.clock.today();
    let search = query.search.as_deref();

    let open: Vec<_> = deps
        .store
        .list_open_requests(today, query.dog_size)
        .await?
        .into_iter()
        .filter(|r| r.owner_id != actor.member_id)
        .collect();
    let candidates = open.len();

    let visible = filter_visible(open, &prefs, search, query.dog_size, today);

    debug!(
        walker_id = %actor.member_id,
        rule = ?rule_for(&prefs, search),
        candidates,
        visible = visible.len(),
        "Matched open requests"
    );

    Ok(visible)
}
