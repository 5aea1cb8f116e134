//! Facts emitted after a lifecycle transaction commits.
//!
//! Events are published on the in-process [`EventHub`](crate::kernel::EventHub)
//! and never feed back into the engine. Each one names the member(s) who
//! should hear about it so the notification dispatcher needs no lookups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::{AssignmentId, MemberId, OfferId, RequestId};
use crate::domains::walks::models::CancelParty;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalkEvent {
    RequestCreated {
        request_id: RequestId,
        owner_id: MemberId,
    },
    RequestCancelled {
        request_id: RequestId,
        owner_id: MemberId,
        rejected_walkers: Vec<MemberId>,
    },
    OfferSubmitted {
        offer_id: OfferId,
        request_id: RequestId,
        owner_id: MemberId,
        walker_id: MemberId,
        price: Decimal,
    },
    OfferAccepted {
        offer_id: OfferId,
        request_id: RequestId,
        assignment_id: AssignmentId,
        walker_id: MemberId,
        rejected_walkers: Vec<MemberId>,
    },
    OfferRejected {
        offer_id: OfferId,
        request_id: RequestId,
        walker_id: MemberId,
    },
    WalkStarted {
        assignment_id: AssignmentId,
        owner_id: MemberId,
        walker_id: MemberId,
        started_at: DateTime<Utc>,
    },
    WalkCompleted {
        assignment_id: AssignmentId,
        owner_id: MemberId,
        walker_id: MemberId,
        duration_minutes: i32,
        platform_fee_amount: Decimal,
    },
    WalkCancelled {
        assignment_id: AssignmentId,
        owner_id: MemberId,
        walker_id: MemberId,
        cancelled_by: CancelParty,
        reason: String,
    },
    PaymentMarked {
        assignment_id: AssignmentId,
        owner_id: MemberId,
        walker_id: MemberId,
    },
    FeesSettled {
        assignment_ids: Vec<AssignmentId>,
        settled_by: MemberId,
    },
}

impl WalkEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WalkEvent::RequestCreated { .. } => "request_created",
            WalkEvent::RequestCancelled { .. } => "request_cancelled",
            WalkEvent::OfferSubmitted { .. } => "offer_submitted",
            WalkEvent::OfferAccepted { .. } => "offer_accepted",
            WalkEvent::OfferRejected { .. } => "offer_rejected",
            WalkEvent::WalkStarted { .. } => "walk_started",
            WalkEvent::WalkCompleted { .. } => "walk_completed",
            WalkEvent::WalkCancelled { .. } => "walk_cancelled",
            WalkEvent::PaymentMarked { .. } => "payment_marked",
            WalkEvent::FeesSettled { .. } => "fees_settled",
        }
    }

    /// Members to notify, in no particular order.
    pub fn recipients(&self) -> Vec<MemberId> {
        match self {
            WalkEvent::RequestCreated { .. } | WalkEvent::FeesSettled { .. } => Vec::new(),
            WalkEvent::RequestCancelled {
                rejected_walkers, ..
            } => rejected_walkers.clone(),
            WalkEvent::OfferSubmitted { owner_id, .. } => vec![*owner_id],
            WalkEvent::OfferAccepted {
                walker_id,
                rejected_walkers,
                ..
            } => std::iter::once(*walker_id)
                .chain(rejected_walkers.iter().copied())
                .collect(),
            WalkEvent::OfferRejected { walker_id, .. } => vec![*walker_id],
            WalkEvent::WalkStarted { owner_id, .. }
            | WalkEvent::WalkCompleted { owner_id, .. } => vec![*owner_id],
            WalkEvent::WalkCancelled {
                owner_id,
                walker_id,
                cancelled_by,
                ..
            } => match cancelled_by {
                CancelParty::Owner => vec![*walker_id],
                CancelParty::Walker => vec![*owner_id],
            },
            WalkEvent::PaymentMarked { walker_id, .. } => vec![*walker_id],
        }
    }
}
