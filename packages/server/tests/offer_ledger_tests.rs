//! Offer ledger tests: eligibility, duplicates, acceptance atomicity and the
//! concurrent-accept race.

mod common;

use crate::common::*;
use test_context::test_context;
use walks_core::common::{Actor, MemberId, OfferId};
use walks_core::domains::walks::activities::{
    accept_offer, cancel_request, list_request_offers, list_walker_offers, reject_offer,
    submit_offer, SubmitOffer,
};
use walks_core::domains::walks::models::{AssignmentStatus, OfferStatus, RequestStatus};
use walks_core::domains::walks::{ErrorKind, WalkError, WalkStore};
use walks_core::kernel::VerificationStatus;

fn offer_of(amount: i64) -> SubmitOffer {
    SubmitOffer {
        price: price(amount),
        message: Some("  Happy to help  ".to_string()),
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verified_walker_submits_pending_offer(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let walker = verified_walker(ctx);

    let offer = submit_offer(&walker, request.id, offer_of(150), &ctx.deps)
        .await
        .unwrap();

    assert_eq!(offer.status, OfferStatus::Pending);
    assert_eq!(offer.price, price(150));
    assert_eq!(offer.message.as_deref(), Some("Happy to help"));

    let mine = list_walker_offers(&walker, &ctx.deps).await.unwrap();
    assert_eq!(mine.len(), 1);
    let on_request = list_request_offers(&owner, request.id, &ctx.deps).await.unwrap();
    assert_eq!(on_request[0].id, offer.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_the_owner_sees_offers_on_a_request(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let walker = verified_walker(ctx);
    bid(ctx, &walker, &request, 150).await;

    let err = list_request_offers(&walker, request.id, &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unverified_walker_is_not_eligible(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let walker = Actor::walker(MemberId::new());
    ctx.mocks
        .directory
        .set_verification(walker.member_id, VerificationStatus::Pending);

    let err = submit_offer(&walker, request.id, offer_of(150), &ctx.deps)
        .await
        .unwrap_err();

    assert!(matches!(err, WalkError::NotEligible));
    assert_eq!(err.kind(), ErrorKind::BusinessRule);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn blocked_walker_cannot_bid(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let walker = verified_walker(ctx);
    ctx.mocks.directory.block(owner.member_id, walker.member_id);

    let err = submit_offer(&walker, request.id, offer_of(150), &ctx.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, WalkError::Blocked));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn owners_cannot_bid(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;

    let err = submit_offer(&owner, request.id, offer_of(150), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    // Same member acting as a walker on their own request
    let as_walker = Actor::walker(owner.member_id);
    ctx.mocks.directory.verify(owner.member_id);
    let err = submit_offer(&as_walker, request.id, offer_of(150), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn second_offer_from_same_walker_is_duplicate(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let walker = verified_walker(ctx);
    bid(ctx, &walker, &request, 150).await;

    let err = submit_offer(&walker, request.id, offer_of(120), &ctx.deps)
        .await
        .unwrap_err();

    assert!(matches!(err, WalkError::DuplicateOffer));
    assert_eq!(ctx.deps.store.list_request_offers(request.id).await.unwrap().len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn price_below_a_cent_is_invalid(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;

    let offer = SubmitOffer {
        price: "140.555".parse().unwrap(),
        message: None,
    };
    let err = submit_offer(&verified_walker(ctx), request.id, offer, &ctx.deps)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(ctx.deps.store.list_request_offers(request.id).await.unwrap().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn non_positive_price_is_invalid(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;

    let err = submit_offer(&verified_walker(ctx), request.id, offer_of(0), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cancelled_request_takes_no_offers(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    cancel_request(&owner, request.id, &ctx.deps).await.unwrap();

    let err = submit_offer(&verified_walker(ctx), request.id, offer_of(150), &ctx.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, WalkError::NotOpen));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn accepting_rejects_siblings_and_creates_one_assignment(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let winner = bid(ctx, &verified_walker(ctx), &request, 160).await;
    let loser_a = bid(ctx, &verified_walker(ctx), &request, 130).await;
    let loser_b = bid(ctx, &verified_walker(ctx), &request, 145).await;

    let assignment = accept_offer(&owner, winner.id, &ctx.deps).await.unwrap();

    assert_eq!(assignment.status, AssignmentStatus::Pending);
    assert_eq!(assignment.agreed_price, price(160));
    assert_eq!(assignment.walker_id, winner.walker_id);
    assert_eq!(assignment.owner_id, owner.member_id);

    let offers = ctx.deps.store.list_request_offers(request.id).await.unwrap();
    let status_of = |id: OfferId| offers.iter().find(|o| o.id == id).map(|o| o.status);
    assert_eq!(status_of(winner.id), Some(OfferStatus::Accepted));
    assert_eq!(status_of(loser_a.id), Some(OfferStatus::Rejected));
    assert_eq!(status_of(loser_b.id), Some(OfferStatus::Rejected));

    let request = ctx.deps.store.find_request(request.id).await.unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Assigned);
    assert_eq!(ctx.mocks.store.assignment_count().await, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_the_owner_accepts(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let walker = verified_walker(ctx);
    let offer = bid(ctx, &walker, &request, 150).await;

    let err = accept_offer(&walker, offer.id, &ctx.deps).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(ctx.mocks.store.assignment_count().await, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn rejected_offer_cannot_be_accepted(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let offer = bid(ctx, &verified_walker(ctx), &request, 150).await;

    let rejected = reject_offer(&owner, offer.id, &ctx.deps).await.unwrap();
    assert_eq!(rejected.status, OfferStatus::Rejected);

    let err = accept_offer(&owner, offer.id, &ctx.deps).await.unwrap_err();
    assert!(matches!(err, WalkError::OfferNotPending(_)));

    let err = reject_offer(&owner, offer.id, &ctx.deps).await.unwrap_err();
    assert!(err.is_conflict());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn accepting_after_assignment_is_no_longer_open(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let first = bid(ctx, &verified_walker(ctx), &request, 150).await;
    let second = bid(ctx, &verified_walker(ctx), &request, 155).await;

    accept_offer(&owner, first.id, &ctx.deps).await.unwrap();
    let err = accept_offer(&owner, second.id, &ctx.deps).await.unwrap_err();

    assert!(matches!(err, WalkError::RequestNoLongerOpen));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_accepts_have_exactly_one_winner(ctx: &TestHarness) {
    let (owner, dog_id) = owner_with_dog(ctx, None);
    let request = post_request(ctx, &owner, dog_id).await;
    let a = bid(ctx, &verified_walker(ctx), &request, 150).await;
    let b = bid(ctx, &verified_walker(ctx), &request, 140).await;

    let (first, second) = tokio::join!(
        accept_offer(&owner, a.id, &ctx.deps),
        accept_offer(&owner, b.id, &ctx.deps),
    );

    let results = [first, second];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(winners, 1);
    assert_eq!(losers.len(), 1);
    assert!(matches!(losers[0], WalkError::RequestNoLongerOpen));

    let offers = ctx.deps.store.list_request_offers(request.id).await.unwrap();
    let accepted = offers
        .iter()
        .filter(|o| o.status == OfferStatus::Accepted)
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(ctx.mocks.store.assignment_count().await, 1);
}
