pub mod assignment;
pub mod offer;
pub mod route_point;
pub mod status;
pub mod walk_request;

pub use assignment::{CompletedWalkFilter, WalkAssignment};
pub use offer::Offer;
pub use route_point::RoutePoint;
pub use status::{
    ensure_transition, AssignmentStatus, CancelParty, DogSize, FeeStatus, Lifecycle, OfferStatus,
    PaymentStatus, RequestStatus,
};
pub use walk_request::WalkRequest;
