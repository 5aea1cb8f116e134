use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

use super::summary::{EarningsLine, EarningsSummary};
use crate::common::pagination::page_after;
use crate::common::{Actor, AssignmentId, PageInfo, PaginationArgs, Role};
use crate::domains::walks::errors::{WalkError, WalkResult};
use crate::domains::walks::events::WalkEvent;
use crate::domains::walks::models::CompletedWalkFilter;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EarningsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub only_pending: bool,
    pub first: Option<i32>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkerEarnings {
    /// Computed over the whole filtered set, not just this page.
    pub summary: EarningsSummary,
    pub transactions: Vec<EarningsLine>,
    pub page_info: PageInfo,
}

/// The calling walker's completed walks, newest first, with totals.
pub async fn walker_earnings(
    actor: &Actor,
    query: EarningsQuery,
    deps: &ServerDeps,
) -> WalkResult<WalkerEarnings> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(WalkError::validation("from must not be after to"));
        }
    }
    let page = PaginationArgs {
        first: query.first,
        after: query.after,
    }
    .validate()
    .map_err(WalkError::validation)?;

    let filter = CompletedWalkFilter {
        from: query.from,
        to: query.to,
        only_unpaid: query.only_pending,
    };
    let completed = deps
        .store
        .completed_assignments(actor.member_id, &filter)
        .await?;

    let summary = EarningsSummary::from_assignments(&completed);
    let (rows, page_info) = page_after(completed, &page, |a| a.id.into_uuid());

    Ok(WalkerEarnings {
        summary,
        transactions: rows.iter().map(EarningsLine::from).collect(),
        page_info,
    })
}

/// Operator marks platform fees as collected. Ids that are unknown, not yet
/// due or already settled are skipped. Returns how many changed.
pub async fn settle_fees(
    actor: &Actor,
    assignment_ids: Vec<AssignmentId>,
    deps: &ServerDeps,
) -> WalkResult<usize> {
    actor.require(Role::Operator)?;

    let ids: Vec<AssignmentId> = assignment_ids
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Ok(0);
    }

    let settled = deps.store.settle_fees(&ids, deps.clock.now()).await?;

    info!(
        operator_id = %actor.member_id,
        requested = ids.len(),
        settled = settled.len(),
        "Platform fees settled"
    );
    if !settled.is_empty() {
        deps.events.publish(WalkEvent::FeesSettled {
            assignment_ids: settled.clone(),
            settled_by: actor.member_id,
        });
    }

    Ok(settled.len())
}
