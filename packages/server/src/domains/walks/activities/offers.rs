//! Offer ledger: bidding, acceptance and rejection.
//!
//! Every write locks the parent request first, then the offer. Acceptance
//! re-checks that the request is still OPEN under that lock, so two owners'
//! clicks (or one owner double-clicking) produce exactly one assignment.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::validate_price;
use crate::common::{Actor, OfferId, RequestId, Role};
use crate::domains::walks::errors::{WalkError, WalkResult};
use crate::domains::walks::events::WalkEvent;
use crate::domains::walks::models::{
    ensure_transition, Offer, OfferStatus, RequestStatus, WalkAssignment,
};
use crate::kernel::{ServerDeps, VerificationStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOffer {
    pub price: Decimal,
    pub message: Option<String>,
}

pub async fn submit_offer(
    actor: &Actor,
    request_id: RequestId,
    input: SubmitOffer,
    deps: &ServerDeps,
) -> WalkResult<Offer> {
    actor.require(Role::Walker)?;
    let walker_id = actor.member_id;

    validate_price("price", input.price)?;

    let request = deps
        .store
        .find_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;

    if request.owner_id == walker_id {
        return Err(WalkError::forbidden("cannot bid on your own request"));
    }

    if deps.directory.verification_status(walker_id).await? != VerificationStatus::Verified {
        return Err(WalkError::NotEligible);
    }
    if request.status != RequestStatus::Open {
        return Err(WalkError::NotOpen);
    }
    if deps.directory.is_blocked(request.owner_id, walker_id).await? {
        return Err(WalkError::Blocked);
    }

    let message = input
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    let offer = Offer::new(request_id, walker_id, input.price, message, deps.clock.now());

    let mut tx = deps.store.begin().await?;
    let locked = tx
        .lock_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;
    if locked.status != RequestStatus::Open {
        return Err(WalkError::NotOpen);
    }
    if tx.find_offer_by_walker(request_id, walker_id).await?.is_some() {
        return Err(WalkError::DuplicateOffer);
    }
    if !tx.insert_offer(&offer).await? {
        return Err(WalkError::DuplicateOffer);
    }
    tx.commit().await?;

    info!(
        offer_id = %offer.id,
        request_id = %request_id,
        walker_id = %walker_id,
        price = %offer.price,
        "Offer submitted"
    );
    deps.events.publish(WalkEvent::OfferSubmitted {
        offer_id: offer.id,
        request_id,
        owner_id: request.owner_id,
        walker_id,
        price: offer.price,
    });

    Ok(offer)
}

/// All offers on a request, newest first. Owner only.
pub async fn list_request_offers(
    actor: &Actor,
    request_id: RequestId,
    deps: &ServerDeps,
) -> WalkResult<Vec<Offer>> {
    let request = deps
        .store
        .find_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;

    if request.owner_id != actor.member_id {
        return Err(WalkError::forbidden("only the owner can see offers"));
    }

    Ok(deps.store.list_request_offers(request_id).await?)
}

/// The caller's own bids, newest first.
pub async fn list_walker_offers(actor: &Actor, deps: &ServerDeps) -> WalkResult<Vec<Offer>> {
    Ok(deps.store.list_walker_offers(actor.member_id).await?)
}

/// Accepts one offer, rejects its PENDING siblings, assigns the request and
/// creates the assignment, all in one transaction.
pub async fn accept_offer(
    actor: &Actor,
    offer_id: OfferId,
    deps: &ServerDeps,
) -> WalkResult<WalkAssignment> {
    let request_id = deps
        .store
        .find_offer(offer_id)
        .await?
        .ok_or(WalkError::NotFound("Offer"))?
        .request_id;

    let mut tx = deps.store.begin().await?;
    let mut request = tx
        .lock_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;
    let mut offer = tx
        .lock_offer(offer_id)
        .await?
        .ok_or(WalkError::NotFound("Offer"))?;

    if request.owner_id != actor.member_id {
        return Err(WalkError::forbidden("only the owner can accept offers"));
    }
    if request.status != RequestStatus::Open {
        return Err(WalkError::RequestNoLongerOpen);
    }
    if offer.status != OfferStatus::Pending {
        return Err(WalkError::OfferNotPending(offer.status.to_string()));
    }
    ensure_transition(offer.status, OfferStatus::Accepted)?;
    ensure_transition(request.status, RequestStatus::Assigned)?;

    let now = deps.clock.now();

    offer.status = OfferStatus::Accepted;
    offer.updated_at = now;
    tx.update_offer(&offer).await?;

    let rejected = tx
        .reject_pending_offers(request.id, Some(offer.id), now)
        .await?;

    request.status = RequestStatus::Assigned;
    request.updated_at = now;
    tx.update_request(&request).await?;

    let assignment =
        WalkAssignment::new(request.id, offer.walker_id, request.owner_id, offer.price, now);
    tx.insert_assignment(&assignment).await?;

    tx.commit().await?;

    info!(
        offer_id = %offer.id,
        request_id = %request.id,
        assignment_id = %assignment.id,
        walker_id = %offer.walker_id,
        rejected_offers = rejected.len(),
        "Offer accepted"
    );
    deps.events.publish(WalkEvent::OfferAccepted {
        offer_id: offer.id,
        request_id: request.id,
        assignment_id: assignment.id,
        walker_id: offer.walker_id,
        rejected_walkers: rejected.iter().map(|o| o.walker_id).collect(),
    });

    Ok(assignment)
}

pub async fn reject_offer(actor: &Actor, offer_id: OfferId, deps: &ServerDeps) -> WalkResult<Offer> {
    let request_id = deps
        .store
        .find_offer(offer_id)
        .await?
        .ok_or(WalkError::NotFound("Offer"))?
        .request_id;

    let mut tx = deps.store.begin().await?;
    let request = tx
        .lock_request(request_id)
        .await?
        .ok_or(WalkError::NotFound("Walk request"))?;
    let mut offer = tx
        .lock_offer(offer_id)
        .await?
        .ok_or(WalkError::NotFound("Offer"))?;

    if request.owner_id != actor.member_id {
        return Err(WalkError::forbidden("only the owner can reject offers"));
    }
    if offer.status != OfferStatus::Pending {
        return Err(WalkError::OfferNotPending(offer.status.to_string()));
    }
    ensure_transition(offer.status, OfferStatus::Rejected)?;

    offer.status = OfferStatus::Rejected;
    offer.updated_at = deps.clock.now();
    tx.update_offer(&offer).await?;
    tx.commit().await?;

    info!(offer_id = %offer.id, request_id = %request_id, "Offer rejected");
    deps.events.publish(WalkEvent::OfferRejected {
        offer_id: offer.id,
        request_id,
        walker_id: offer.walker_id,
    });

    Ok(offer)
}
