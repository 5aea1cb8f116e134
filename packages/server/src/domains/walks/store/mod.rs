//! Persistence seam for the walk lifecycle.
//!
//! Every multi-row transition goes through [`WalkStore::begin`]. The returned
//! [`WalkTx`] row-locks what it reads (`lock_*`), so a precondition checked
//! inside the transaction still holds at commit. Dropping a transaction
//! without calling [`WalkTx::commit`] rolls it back.
//!
//! Plain reads on [`WalkStore`] never lock and must not be called by a task
//! that currently holds an open transaction.

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::common::{AssignmentId, MemberId, OfferId, RequestId};
use crate::domains::walks::models::{
    CompletedWalkFilter, DogSize, Offer, RequestStatus, RoutePoint, WalkAssignment, WalkRequest,
};

pub use memory::MemoryWalkStore;
pub use postgres::PostgresWalkStore;

#[async_trait]
pub trait WalkStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn WalkTx>>;

    /// Connectivity probe for health checks.
    async fn ping(&self) -> Result<()>;

    async fn find_request(&self, id: RequestId) -> Result<Option<WalkRequest>>;

    /// Newest first.
    async fn list_owner_requests(
        &self,
        owner_id: MemberId,
        status: Option<RequestStatus>,
    ) -> Result<Vec<WalkRequest>>;

    /// OPEN requests scheduled on or after `from`, by date then start time.
    async fn list_open_requests(
        &self,
        from: NaiveDate,
        dog_size: Option<DogSize>,
    ) -> Result<Vec<WalkRequest>>;

    async fn find_offer(&self, id: OfferId) -> Result<Option<Offer>>;

    /// Newest first.
    async fn list_request_offers(&self, request_id: RequestId) -> Result<Vec<Offer>>;

    /// Newest first.
    async fn list_walker_offers(&self, walker_id: MemberId) -> Result<Vec<Offer>>;

    async fn find_assignment(&self, id: AssignmentId) -> Result<Option<WalkAssignment>>;

    async fn find_assignment_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<WalkAssignment>>;

    /// Most recently completed first.
    async fn completed_assignments(
        &self,
        walker_id: MemberId,
        filter: &CompletedWalkFilter,
    ) -> Result<Vec<WalkAssignment>>;

    /// Flips DUE fees to SETTLED; returns the ids that changed.
    async fn settle_fees(
        &self,
        ids: &[AssignmentId],
        at: DateTime<Utc>,
    ) -> Result<Vec<AssignmentId>>;

    async fn append_route_point(&self, point: &RoutePoint) -> Result<()>;

    /// Oldest first.
    async fn route_points(&self, assignment_id: AssignmentId) -> Result<Vec<RoutePoint>>;

    async fn last_route_point(&self, assignment_id: AssignmentId) -> Result<Option<RoutePoint>>;
}

#[async_trait]
pub trait WalkTx: Send {
    async fn lock_request(&mut self, id: RequestId) -> Result<Option<WalkRequest>>;

    async fn lock_offer(&mut self, id: OfferId) -> Result<Option<Offer>>;

    async fn lock_assignment(&mut self, id: AssignmentId) -> Result<Option<WalkAssignment>>;

    async fn find_offer_by_walker(
        &mut self,
        request_id: RequestId,
        walker_id: MemberId,
    ) -> Result<Option<Offer>>;

    async fn count_offers(&mut self, request_id: RequestId) -> Result<i64>;

    async fn insert_request(&mut self, request: &WalkRequest) -> Result<()>;

    async fn update_request(&mut self, request: &WalkRequest) -> Result<()>;

    async fn delete_request(&mut self, id: RequestId) -> Result<()>;

    /// `Ok(false)` when the walker already has an offer on the request.
    async fn insert_offer(&mut self, offer: &Offer) -> Result<bool>;

    async fn update_offer(&mut self, offer: &Offer) -> Result<()>;

    /// Rejects every PENDING offer on the request except `keep`.
    async fn reject_pending_offers(
        &mut self,
        request_id: RequestId,
        keep: Option<OfferId>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Offer>>;

    async fn insert_assignment(&mut self, assignment: &WalkAssignment) -> Result<()>;

    async fn update_assignment(&mut self, assignment: &WalkAssignment) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
