//! Typed ID aliases for every entity the walk engine touches.
//!
//! Owners, walkers and operators are all members of the identity service and
//! share `MemberId`; their role travels separately in the auth token.

pub use super::id::Id;

/// Marker types. Kept in their own module so they never collide with the
/// model structs of the same name.
pub mod marker {
    pub struct Member;
    pub struct Dog;
    pub struct WalkRequest;
    pub struct Offer;
    pub struct WalkAssignment;
    pub struct RoutePoint;
}

pub type MemberId = Id<marker::Member>;
pub type DogId = Id<marker::Dog>;
pub type RequestId = Id<marker::WalkRequest>;
pub type OfferId = Id<marker::Offer>;
pub type AssignmentId = Id<marker::WalkAssignment>;
pub type RoutePointId = Id<marker::RoutePoint>;
