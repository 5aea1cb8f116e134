use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::status::{AssignmentStatus, CancelParty, FeeStatus, PaymentStatus};
use crate::common::{AssignmentId, MemberId, RequestId};

/// The accepted, executable instance of a walk request.
///
/// Created exactly once per request when an offer is accepted. Fee fields stay
/// empty until the walk completes; after that only `platform_fee_status`
/// (DUE -> SETTLED) and the payment flag change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WalkAssignment {
    pub id: AssignmentId,
    pub request_id: RequestId,
    pub walker_id: MemberId,
    pub owner_id: MemberId,
    pub status: AssignmentStatus,
    pub agreed_price: Decimal,

    pub platform_fee_rate: Option<Decimal>,
    pub platform_fee_amount: Option<Decimal>,
    pub platform_fee_status: Option<FeeStatus>,
    pub fee_settled_at: Option<DateTime<Utc>>,

    pub payment_status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,

    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub actual_duration_minutes: Option<i32>,

    // Post-walk report
    pub pee: Option<bool>,
    pub poo: Option<bool>,
    pub behavior_rating: Option<i16>,
    pub report_notes: Option<String>,
    pub early_end_reason: Option<String>,

    pub cancelled_by: Option<CancelParty>,
    pub cancelled_by_id: Option<MemberId>,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WalkAssignment {
    pub fn new(
        request_id: RequestId,
        walker_id: MemberId,
        owner_id: MemberId,
        agreed_price: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AssignmentId::new(),
            request_id,
            walker_id,
            owner_id,
            status: AssignmentStatus::Pending,
            agreed_price,
            platform_fee_rate: None,
            platform_fee_amount: None,
            platform_fee_status: None,
            fee_settled_at: None,
            payment_status: PaymentStatus::Unpaid,
            paid_at: None,
            actual_start_time: None,
            actual_end_time: None,
            actual_duration_minutes: None,
            pee: None,
            poo: None,
            behavior_rating: None,
            report_notes: None,
            early_end_reason: None,
            cancelled_by: None,
            cancelled_by_id: None,
            cancel_reason: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_participant(&self, member_id: MemberId) -> bool {
        self.walker_id == member_id || self.owner_id == member_id
    }

    /// Completion date used by settlement date-range filters.
    pub fn completed_on(&self) -> Option<NaiveDate> {
        self.actual_end_time.map(|t| t.date_naive())
    }
}

/// Date-bounded query over a walker's completed walks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedWalkFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub only_unpaid: bool,
}

impl CompletedWalkFilter {
    pub fn matches(&self, assignment: &WalkAssignment) -> bool {
        if assignment.status != AssignmentStatus::Completed {
            return false;
        }
        if self.only_unpaid && assignment.payment_status == PaymentStatus::Paid {
            return false;
        }
        let Some(day) = assignment.completed_on() else {
            return false;
        };
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

// =============================================================================
// SQL
// =============================================================================

impl WalkAssignment {
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        id: AssignmentId,
        executor: E,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM walk_assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_id_for_update<'e, E: PgExecutor<'e>>(
        id: AssignmentId,
        executor: E,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM walk_assignments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_request<'e, E: PgExecutor<'e>>(
        request_id: RequestId,
        executor: E,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM walk_assignments WHERE request_id = $1")
            .bind(request_id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    /// Completed walks for a walker, most recently finished first.
    pub async fn find_completed_for_walker<'e, E: PgExecutor<'e>>(
        walker_id: MemberId,
        filter: &CompletedWalkFilter,
        executor: E,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM walk_assignments
             WHERE walker_id = $1
               AND status = 'completed'
               AND ($2::date IS NULL OR (actual_end_time AT TIME ZONE 'UTC')::date >= $2)
               AND ($3::date IS NULL OR (actual_end_time AT TIME ZONE 'UTC')::date <= $3)
               AND (NOT $4 OR payment_status = 'unpaid')
             ORDER BY actual_end_time DESC, id DESC",
        )
        .bind(walker_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.only_unpaid)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<()> {
        sqlx::query(
            "INSERT INTO walk_assignments (
                id, request_id, walker_id, owner_id, status, agreed_price,
                payment_status, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(self.id)
        .bind(self.request_id)
        .bind(self.walker_id)
        .bind(self.owner_id)
        .bind(self.status)
        .bind(self.agreed_price)
        .bind(self.payment_status)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Writes back every lifecycle-managed column.
    pub async fn update<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<()> {
        sqlx::query(
            "UPDATE walk_assignments SET
                status = $2,
                platform_fee_rate = $3,
                platform_fee_amount = $4,
                platform_fee_status = $5,
                fee_settled_at = $6,
                payment_status = $7,
                paid_at = $8,
                actual_start_time = $9,
                actual_end_time = $10,
                actual_duration_minutes = $11,
                pee = $12,
                poo = $13,
                behavior_rating = $14,
                report_notes = $15,
                early_end_reason = $16,
                cancelled_by = $17,
                cancelled_by_id = $18,
                cancel_reason = $19,
                cancelled_at = $20,
                updated_at = $21
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(self.status)
        .bind(self.platform_fee_rate)
        .bind(self.platform_fee_amount)
        .bind(self.platform_fee_status)
        .bind(self.fee_settled_at)
        .bind(self.payment_status)
        .bind(self.paid_at)
        .bind(self.actual_start_time)
        .bind(self.actual_end_time)
        .bind(self.actual_duration_minutes)
        .bind(self.pee)
        .bind(self.poo)
        .bind(self.behavior_rating)
        .bind(&self.report_notes)
        .bind(&self.early_end_reason)
        .bind(self.cancelled_by)
        .bind(self.cancelled_by_id)
        .bind(&self.cancel_reason)
        .bind(self.cancelled_at)
        .bind(self.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Marks DUE fees as SETTLED. Unknown, unfinished and already settled ids
    /// are skipped; returns the ids that changed.
    pub async fn settle_fees<'e, E: PgExecutor<'e>>(
        ids: &[AssignmentId],
        now: DateTime<Utc>,
        executor: E,
    ) -> Result<Vec<AssignmentId>> {
        sqlx::query_scalar(
            "UPDATE walk_assignments
             SET platform_fee_status = 'settled', fee_settled_at = $2, updated_at = $2
             WHERE id = ANY($1)
               AND status = 'completed'
               AND platform_fee_status = 'due'
             RETURNING id",
        )
        .bind(ids)
        .bind(now)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }
}
