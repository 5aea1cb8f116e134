//! Test fixtures for creating test data.
//!
//! These fixtures go through the same activities the HTTP layer calls, so
//! every fixture row passed the real validation and locking paths.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use walks_core::common::utils::GeoPoint;
use walks_core::common::{Actor, DogId, MemberId};
use walks_core::domains::tracking::LocationSample;
use walks_core::domains::walks::activities::{
    accept_offer, create_request, start_assignment, submit_offer, CreateWalkRequest, SubmitOffer,
};
use walks_core::domains::walks::models::{DogSize, Offer, WalkAssignment, WalkRequest};
use walks_core::kernel::WalkerPreferences;

use super::HasDeps;

/// Plaza de la Constitución, Mexico City.
pub const CENTRO: GeoPoint = GeoPoint {
    latitude: 19.4326,
    longitude: -99.1332,
};

/// Moves `meters` due north of `from`.
pub fn north_of(from: GeoPoint, meters: f64) -> GeoPoint {
    GeoPoint::new(from.latitude + meters / 111_195.0, from.longitude)
}

pub fn price(units: i64) -> Decimal {
    Decimal::from(units)
}

pub fn today(h: &impl HasDeps) -> NaiveDate {
    h.deps().clock.today()
}

/// A new owner with one registered dog.
pub fn owner_with_dog(h: &impl HasDeps, size: Option<DogSize>) -> (Actor, DogId) {
    let owner = Actor::owner(MemberId::new());
    let dog_id = h.mocks().dogs.add_dog(owner.member_id, size);
    (owner, dog_id)
}

/// A VERIFIED walker living in Centro with a 5 km radius.
pub fn verified_walker(h: &impl HasDeps) -> Actor {
    walker_with_preferences(
        h,
        WalkerPreferences {
            home_latitude: Some(CENTRO.latitude),
            home_longitude: Some(CENTRO.longitude),
            service_radius_km: Some(5.0),
            base_zone: Some("Centro".to_string()),
            city: None,
        },
    )
}

pub fn walker_with_preferences(h: &impl HasDeps, prefs: WalkerPreferences) -> Actor {
    let walker = Actor::walker(MemberId::new());
    h.mocks().directory.verify(walker.member_id);
    h.mocks().directory.set_preferences(walker.member_id, prefs);
    walker
}

/// 30-minute walk in Centro at 10:00, suggested price 140.
pub fn walk_input(dog_id: DogId, scheduled_date: NaiveDate) -> CreateWalkRequest {
    CreateWalkRequest {
        dog_id,
        scheduled_date,
        start_time: NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
        duration_minutes: 30,
        latitude: Some(CENTRO.latitude),
        longitude: Some(CENTRO.longitude),
        zone: Some("Centro".to_string()),
        notes: None,
        suggested_price: price(140),
    }
}

pub async fn post_request(h: &impl HasDeps, owner: &Actor, dog_id: DogId) -> WalkRequest {
    create_request(owner, walk_input(dog_id, today(h)), h.deps())
        .await
        .expect("Failed to create walk request")
}

pub async fn bid(h: &impl HasDeps, walker: &Actor, request: &WalkRequest, amount: i64) -> Offer {
    submit_offer(
        walker,
        request.id,
        SubmitOffer {
            price: price(amount),
            message: None,
        },
        h.deps(),
    )
    .await
    .expect("Failed to submit offer")
}

/// Everything created on the way to an assignment.
pub struct AssignedWalk {
    pub owner: Actor,
    pub walker: Actor,
    pub request: WalkRequest,
    pub offer: Offer,
    pub assignment: WalkAssignment,
}

/// Request posted, one 140 offer, accepted.
pub async fn assigned_walk(h: &impl HasDeps) -> AssignedWalk {
    let (owner, dog_id) = owner_with_dog(h, Some(DogSize::Medium));
    let walker = verified_walker(h);
    let request = post_request(h, &owner, dog_id).await;
    let offer = bid(h, &walker, &request, 140).await;
    let assignment = accept_offer(&owner, offer.id, h.deps())
        .await
        .expect("Failed to accept offer");

    AssignedWalk {
        owner,
        walker,
        request,
        offer,
        assignment,
    }
}

/// Assigned and started at the current clock time.
pub async fn started_walk(h: &impl HasDeps) -> AssignedWalk {
    let mut walk = assigned_walk(h).await;
    walk.assignment = start_assignment(&walk.walker, walk.assignment.id, h.deps())
        .await
        .expect("Failed to start walk");
    walk
}

pub fn sample_at(h: &impl HasDeps, point: GeoPoint, accuracy_meters: f64) -> LocationSample {
    LocationSample {
        latitude: point.latitude,
        longitude: point.longitude,
        accuracy_meters,
        recorded_at: h.deps().clock.now(),
    }
}
