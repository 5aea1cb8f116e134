//! In-memory store for tests and local development.
//!
//! A transaction takes the store-wide async mutex, works on a copy of the
//! state and swaps it in on commit, so concurrent transactions serialize the
//! same way row locks make them serialize in Postgres.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::{WalkStore, WalkTx};
use crate::common::{AssignmentId, MemberId, OfferId, RequestId};
use crate::domains::walks::models::{
    CompletedWalkFilter, DogSize, FeeStatus, Offer, OfferStatus, RequestStatus, RoutePoint,
    WalkAssignment, WalkRequest,
};

#[derive(Debug, Clone, Default)]
struct WalkState {
    requests: HashMap<RequestId, WalkRequest>,
    offers: HashMap<OfferId, Offer>,
    assignments: HashMap<AssignmentId, WalkAssignment>,
}

#[derive(Clone, Default)]
pub struct MemoryWalkStore {
    state: Arc<Mutex<WalkState>>,
    routes: Arc<RwLock<HashMap<AssignmentId, Vec<RoutePoint>>>>,
}

impl MemoryWalkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }

    pub async fn assignment_count(&self) -> usize {
        self.state.lock().await.assignments.len()
    }
}

fn newest_offers_first(offers: &mut [Offer]) {
    offers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl WalkStore for MemoryWalkStore {
    async fn begin(&self) -> Result<Box<dyn WalkTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryWalkTx { guard, working }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_request(&self, id: RequestId) -> Result<Option<WalkRequest>> {
        Ok(self.state.lock().await.requests.get(&id).cloned())
    }

    async fn list_owner_requests(
        &self,
        owner_id: MemberId,
        status: Option<RequestStatus>,
    ) -> Result<Vec<WalkRequest>> {
        let state = self.state.lock().await;
        let mut requests: Vec<WalkRequest> = state
            .requests
            .values()
            .filter(|r| r.owner_id == owner_id)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }

    async fn list_open_requests(
        &self,
        from: NaiveDate,
        dog_size: Option<DogSize>,
    ) -> Result<Vec<WalkRequest>> {
        let state = self.state.lock().await;
        let mut requests: Vec<WalkRequest> = state
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Open && r.scheduled_date >= from)
            .filter(|r| dog_size.map_or(true, |size| r.dog_size == Some(size)))
            .cloned()
            .collect();
        requests.sort_by(|a, b| {
            a.scheduled_date
                .cmp(&b.scheduled_date)
                .then(a.start_time.cmp(&b.start_time))
                .then(a.id.cmp(&b.id))
        });
        Ok(requests)
    }

    async fn find_offer(&self, id: OfferId) -> Result<Option<Offer>> {
        Ok(self.state.lock().await.offers.get(&id).cloned())
    }

    async fn list_request_offers(&self, request_id: RequestId) -> Result<Vec<Offer>> {
        let state = self.state.lock().await;
        let mut offers: Vec<Offer> = state
            .offers
            .values()
            .filter(|o| o.request_id == request_id)
            .cloned()
            .collect();
        newest_offers_first(&mut offers);
        Ok(offers)
    }

    async fn list_walker_offers(&self, walker_id: MemberId) -> Result<Vec<Offer>> {
        let state = self.state.lock().await;
        let mut offers: Vec<Offer> = state
            .offers
            .values()
            .filter(|o| o.walker_id == walker_id)
            .cloned()
            .collect();
        newest_offers_first(&mut offers);
        Ok(offers)
    }

    async fn find_assignment(&self, id: AssignmentId) -> Result<Option<WalkAssignment>> {
        Ok(self.state.lock().await.assignments.get(&id).cloned())
    }

    async fn find_assignment_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<WalkAssignment>> {
        let state = self.state.lock().await;
        Ok(state
            .assignments
            .values()
            .find(|a| a.request_id == request_id)
            .cloned())
    }

    async fn completed_assignments(
        &self,
        walker_id: MemberId,
        filter: &CompletedWalkFilter,
    ) -> Result<Vec<WalkAssignment>> {
        let state = self.state.lock().await;
        let mut assignments: Vec<WalkAssignment> = state
            .assignments
            .values()
            .filter(|a| a.walker_id == walker_id && filter.matches(a))
            .cloned()
            .collect();
        assignments.sort_by(|a, b| {
            b.actual_end_time
                .cmp(&a.actual_end_time)
                .then(b.id.cmp(&a.id))
        });
        Ok(assignments)
    }

    async fn settle_fees(
        &self,
        ids: &[AssignmentId],
        at: DateTime<Utc>,
    ) -> Result<Vec<AssignmentId>> {
        let mut state = self.state.lock().await;
        let mut settled = Vec::new();
        for id in ids {
            let Some(assignment) = state.assignments.get_mut(id) else {
                continue;
            };
            if assignment.platform_fee_status != Some(FeeStatus::Due) {
                continue;
            }
            assignment.platform_fee_status = Some(FeeStatus::Settled);
            assignment.fee_settled_at = Some(at);
            assignment.updated_at = at;
            settled.push(*id);
        }
        Ok(settled)
    }

    async fn append_route_point(&self, point: &RoutePoint) -> Result<()> {
        self.routes
            .write()
            .await
            .entry(point.assignment_id)
            .or_default()
            .push(point.clone());
        Ok(())
    }

    async fn route_points(&self, assignment_id: AssignmentId) -> Result<Vec<RoutePoint>> {
        let mut points = self
            .routes
            .read()
            .await
            .get(&assignment_id)
            .cloned()
            .unwrap_or_default();
        points.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at).then(a.id.cmp(&b.id)));
        Ok(points)
    }

    async fn last_route_point(&self, assignment_id: AssignmentId) -> Result<Option<RoutePoint>> {
        Ok(self.route_points(assignment_id).await?.pop())
    }
}

pub struct MemoryWalkTx {
    guard: OwnedMutexGuard<WalkState>,
    working: WalkState,
}

#[async_trait]
impl WalkTx for MemoryWalkTx {
    async fn lock_request(&mut self, id: RequestId) -> Result<Option<WalkRequest>> {
        Ok(self.working.requests.get(&id).cloned())
    }

    async fn lock_offer(&mut self, id: OfferId) -> Result<Option<Offer>> {
        Ok(self.working.offers.get(&id).cloned())
    }

    async fn lock_assignment(&mut self, id: AssignmentId) -> Result<Option<WalkAssignment>> {
        Ok(self.working.assignments.get(&id).cloned())
    }

    async fn find_offer_by_walker(
        &mut self,
        request_id: RequestId,
        walker_id: MemberId,
    ) -> Result<Option<Offer>> {
        Ok(self
            .working
            .offers
            .values()
            .find(|o| o.request_id == request_id && o.walker_id == walker_id)
            .cloned())
    }

    async fn count_offers(&mut self, request_id: RequestId) -> Result<i64> {
        let count = self
            .working
            .offers
            .values()
            .filter(|o| o.request_id == request_id)
            .count();
        Ok(count as i64)
    }

    async fn insert_request(&mut self, request: &WalkRequest) -> Result<()> {
        if self.working.requests.contains_key(&request.id) {
            bail!("walk request {} already exists", request.id);
        }
        self.working.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn update_request(&mut self, request: &WalkRequest) -> Result<()> {
        self.working.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn delete_request(&mut self, id: RequestId) -> Result<()> {
        self.working.requests.remove(&id);
        Ok(())
    }

    async fn insert_offer(&mut self, offer: &Offer) -> Result<bool> {
        let duplicate = self
            .working
            .offers
            .values()
            .any(|o| o.request_id == offer.request_id && o.walker_id == offer.walker_id);
        if duplicate {
            return Ok(false);
        }
        self.working.offers.insert(offer.id, offer.clone());
        Ok(true)
    }

    async fn update_offer(&mut self, offer: &Offer) -> Result<()> {
        self.working.offers.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn reject_pending_offers(
        &mut self,
        request_id: RequestId,
        keep: Option<OfferId>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Offer>> {
        let mut rejected = Vec::new();
        for offer in self.working.offers.values_mut() {
            if offer.request_id != request_id
                || offer.status != OfferStatus::Pending
                || Some(offer.id) == keep
            {
                continue;
            }
            offer.status = OfferStatus::Rejected;
            offer.updated_at = at;
            rejected.push(offer.clone());
        }
        Ok(rejected)
    }

    async fn insert_assignment(&mut self, assignment: &WalkAssignment) -> Result<()> {
        let taken = self
            .working
            .assignments
            .values()
            .any(|a| a.request_id == assignment.request_id);
        if taken {
            bail!("walk request {} already has an assignment", assignment.request_id);
        }
        self.working.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn update_assignment(&mut self, assignment: &WalkAssignment) -> Result<()> {
        self.working.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryWalkTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use rust_decimal::Decimal;

    fn request(owner: MemberId) -> WalkRequest {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        WalkRequest::builder()
            .owner_id(owner)
            .dog_id(crate::common::DogId::new())
            .scheduled_date(NaiveDate::from_ymd_opt(2026, 5, 2).unwrap())
            .start_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
            .duration_minutes(30)
            .zone("Centro")
            .suggested_price(Decimal::from(140))
            .created_at(now)
            .updated_at(now)
            .build()
    }

    #[tokio::test]
    async fn uncommitted_transaction_is_discarded() {
        let store = MemoryWalkStore::new();
        let req = request(MemberId::new());

        let mut tx = store.begin().await.unwrap();
        tx.insert_request(&req).await.unwrap();
        drop(tx);

        assert!(store.find_request(req.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = MemoryWalkStore::new();
        let req = request(MemberId::new());

        let mut tx = store.begin().await.unwrap();
        tx.insert_request(&req).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.find_request(req.id).await.unwrap(), Some(req));
    }

    #[tokio::test]
    async fn second_offer_from_same_walker_is_refused() {
        let store = MemoryWalkStore::new();
        let req = request(MemberId::new());
        let walker = MemberId::new();
        let now = req.created_at;

        let mut tx = store.begin().await.unwrap();
        tx.insert_request(&req).await.unwrap();
        let first = Offer::new(req.id, walker, Decimal::from(120), None, now);
        let second = Offer::new(req.id, walker, Decimal::from(110), None, now);
        assert!(tx.insert_offer(&first).await.unwrap());
        assert!(!tx.insert_offer(&second).await.unwrap());
        tx.commit().await.unwrap();

        assert_eq!(store.list_request_offers(req.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn settle_fees_skips_unknown_and_not_due() {
        let store = MemoryWalkStore::new();
        let req = request(MemberId::new());
        let now = req.created_at;
        let mut due = WalkAssignment::new(req.id, MemberId::new(), req.owner_id, Decimal::from(140), now);
        due.platform_fee_status = Some(FeeStatus::Due);

        let mut tx = store.begin().await.unwrap();
        tx.insert_assignment(&due).await.unwrap();
        tx.commit().await.unwrap();

        let settled = store
            .settle_fees(&[due.id, AssignmentId::new()], now)
            .await
            .unwrap();
        assert_eq!(settled, vec![due.id]);

        let again = store.settle_fees(&[due.id], now).await.unwrap();
        assert!(again.is_empty());
    }
}
