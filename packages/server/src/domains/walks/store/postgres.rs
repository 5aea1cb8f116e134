use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::{WalkStore, WalkTx};
use crate::common::{AssignmentId, MemberId, OfferId, RequestId};
use crate::domains::walks::models::{
    CompletedWalkFilter, DogSize, Offer, RequestStatus, RoutePoint, WalkAssignment, WalkRequest,
};

/// Production store. All SQL lives on the model types; this only routes
/// calls to the pool or to the open transaction.
#[derive(Clone)]
pub struct PostgresWalkStore {
    pool: PgPool,
}

impl PostgresWalkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WalkStore for PostgresWalkStore {
    async fn begin(&self) -> Result<Box<dyn WalkTx>> {
        let tx = self.pool.begin().await.context("Failed to begin transaction")?;
        Ok(Box::new(PgWalkTx { tx }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_request(&self, id: RequestId) -> Result<Option<WalkRequest>> {
        WalkRequest::find_by_id(id, &self.pool).await
    }

    async fn list_owner_requests(
        &self,
        owner_id: MemberId,
        status: Option<RequestStatus>,
    ) -> Result<Vec<WalkRequest>> {
        WalkRequest::find_by_owner(owner_id, status, &self.pool).await
    }

    async fn list_open_requests(
        &self,
        from: NaiveDate,
        dog_size: Option<DogSize>,
    ) -> Result<Vec<WalkRequest>> {
        WalkRequest::find_open_from(from, dog_size, &self.pool).await
    }

    async fn find_offer(&self, id: OfferId) -> Result<Option<Offer>> {
        Offer::find_by_id(id, &self.pool).await
    }

    async fn list_request_offers(&self, request_id: RequestId) -> Result<Vec<Offer>> {
        Offer::find_by_request(request_id, &self.pool).await
    }

    async fn list_walker_offers(&self, walker_id: MemberId) -> Result<Vec<Offer>> {
        Offer::find_by_walker(walker_id, &self.pool).await
    }

    async fn find_assignment(&self, id: AssignmentId) -> Result<Option<WalkAssignment>> {
        WalkAssignment::find_by_id(id, &self.pool).await
    }

    async fn find_assignment_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<WalkAssignment>> {
        WalkAssignment::find_by_request(request_id, &self.pool).await
    }

    async fn completed_assignments(
        &self,
        walker_id: MemberId,
        filter: &CompletedWalkFilter,
    ) -> Result<Vec<WalkAssignment>> {
        WalkAssignment::find_completed_for_walker(walker_id, filter, &self.pool).await
    }

    async fn settle_fees(
        &self,
        ids: &[AssignmentId],
        at: DateTime<Utc>,
    ) -> Result<Vec<AssignmentId>> {
        WalkAssignment::settle_fees(ids, at, &self.pool).await
    }

    async fn append_route_point(&self, point: &RoutePoint) -> Result<()> {
        point.insert(&self.pool).await
    }

    async fn route_points(&self, assignment_id: AssignmentId) -> Result<Vec<RoutePoint>> {
        RoutePoint::find_by_assignment(assignment_id, &self.pool).await
    }

    async fn last_route_point(&self, assignment_id: AssignmentId) -> Result<Option<RoutePoint>> {
        RoutePoint::find_last(assignment_id, &self.pool).await
    }
}

pub struct PgWalkTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl WalkTx for PgWalkTx {
    async fn lock_request(&mut self, id: RequestId) -> Result<Option<WalkRequest>> {
        WalkRequest::find_by_id_for_update(id, &mut *self.tx).await
    }

    async fn lock_offer(&mut self, id: OfferId) -> Result<Option<Offer>> {
        Offer::find_by_id_for_update(id, &mut *self.tx).await
    }

    async fn lock_assignment(&mut self, id: AssignmentId) -> Result<Option<WalkAssignment>> {
        WalkAssignment::find_by_id_for_update(id, &mut *self.tx).await
    }

    async fn find_offer_by_walker(
        &mut self,
        request_id: RequestId,
        walker_id: MemberId,
    ) -> Result<Option<Offer>> {
        Offer::find_by_request_and_walker(request_id, walker_id, &mut *self.tx).await
    }

    async fn count_offers(&mut self, request_id: RequestId) -> Result<i64> {
        Offer::count_for_request(request_id, &mut *self.tx).await
    }

    async fn insert_request(&mut self, request: &WalkRequest) -> Result<()> {
        request.insert(&mut *self.tx).await
    }

    async fn update_request(&mut self, request: &WalkRequest) -> Result<()> {
        request.update(&mut *self.tx).await
    }

    async fn delete_request(&mut self, id: RequestId) -> Result<()> {
        WalkRequest::delete(id, &mut *self.tx).await
    }

    async fn insert_offer(&mut self, offer: &Offer) -> Result<bool> {
        offer.insert(&mut *self.tx).await
    }

    async fn update_offer(&mut self, offer: &Offer) -> Result<()> {
        offer.update_status(&mut *self.tx).await
    }

    async fn reject_pending_offers(
        &mut self,
        request_id: RequestId,
        keep: Option<OfferId>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Offer>> {
        Offer::reject_pending_siblings(request_id, keep, at, &mut *self.tx).await
    }

    async fn insert_assignment(&mut self, assignment: &WalkAssignment) -> Result<()> {
        assignment.insert(&mut *self.tx).await
    }

    async fn update_assignment(&mut self, assignment: &WalkAssignment) -> Result<()> {
        assignment.update(&mut *self.tx).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.context("Failed to commit transaction")
    }
}
