use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::status::OfferStatus;
use crate::common::{MemberId, OfferId, RequestId};

/// A walker's bid against an open request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Offer {
    pub id: OfferId,
    pub request_id: RequestId,
    pub walker_id: MemberId,
    pub price: Decimal,
    pub message: Option<String>,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    pub fn new(
        request_id: RequestId,
        walker_id: MemberId,
        price: Decimal,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OfferId::new(),
            request_id,
            walker_id,
            price,
            message,
            status: OfferStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// SQL
// =============================================================================

impl Offer {
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(id: OfferId, executor: E) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_id_for_update<'e, E: PgExecutor<'e>>(
        id: OfferId,
        executor: E,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM offers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_request_and_walker<'e, E: PgExecutor<'e>>(
        request_id: RequestId,
        walker_id: MemberId,
        executor: E,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM offers WHERE request_id = $1 AND walker_id = $2")
            .bind(request_id)
            .bind(walker_id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    /// Newest first.
    pub async fn find_by_request<'e, E: PgExecutor<'e>>(
        request_id: RequestId,
        executor: E,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM offers WHERE request_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(request_id)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }

    /// Newest first.
    pub async fn find_by_walker<'e, E: PgExecutor<'e>>(
        walker_id: MemberId,
        executor: E,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM offers WHERE walker_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(walker_id)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn count_for_request<'e, E: PgExecutor<'e>>(
        request_id: RequestId,
        executor: E,
    ) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM offers WHERE request_id = $1")
            .bind(request_id)
            .fetch_one(executor)
            .await
            .map_err(Into::into)
    }

    /// Inserts the offer. A unique violation on (request_id, walker_id)
    /// surfaces as `Ok(false)` so callers can report a duplicate.
    pub async fn insert<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO offers (id, request_id, walker_id, price, message, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (request_id, walker_id) DO NOTHING",
        )
        .bind(self.id)
        .bind(self.request_id)
        .bind(self.walker_id)
        .bind(self.price)
        .bind(&self.message)
        .bind(self.status)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn update_status<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<()> {
        sqlx::query("UPDATE offers SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(self.id)
            .bind(self.status)
            .bind(self.updated_at)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Rejects every still-pending offer on the request except `keep` and
    /// returns the rows it changed.
    pub async fn reject_pending_siblings<'e, E: PgExecutor<'e>>(
        request_id: RequestId,
        keep: Option<OfferId>,
        now: DateTime<Utc>,
        executor: E,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE offers SET status = 'rejected', updated_at = $3
             WHERE request_id = $1
               AND status = 'pending'
               AND ($2::uuid IS NULL OR id <> $2)
             RETURNING *",
        )
        .bind(request_id)
        .bind(keep)
        .bind(now)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }
}
