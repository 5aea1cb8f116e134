use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use typed_builder::TypedBuilder;

use super::status::{DogSize, RequestStatus};
use crate::common::utils::GeoPoint;
use crate::common::{DogId, MemberId, RequestId};

/// An owner's posted need for a walk.
///
/// The point is approximate (owners share a coarse location until a walker is
/// assigned) and either the point or the zone label must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct WalkRequest {
    #[builder(default = RequestId::new())]
    pub id: RequestId,
    pub owner_id: MemberId,
    pub dog_id: DogId,
    #[builder(default, setter(strip_option))]
    pub dog_size: Option<DogSize>,

    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,

    #[builder(default, setter(strip_option))]
    pub latitude: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub longitude: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub zone: Option<String>,
    #[builder(default, setter(strip_option))]
    pub notes: Option<String>,

    pub suggested_price: Decimal,
    #[builder(default = RequestStatus::Open)]
    pub status: RequestStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WalkRequest {
    pub fn point(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }
}

// =============================================================================
// SQL
// =============================================================================

impl WalkRequest {
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(id: RequestId, executor: E) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM walk_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    /// Row-locks the request for the rest of the transaction.
    pub async fn find_by_id_for_update<'e, E: PgExecutor<'e>>(
        id: RequestId,
        executor: E,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM walk_requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_owner<'e, E: PgExecutor<'e>>(
        owner_id: MemberId,
        status: Option<RequestStatus>,
        executor: E,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM walk_requests
             WHERE owner_id = $1
               AND ($2::walk_request_status IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .bind(status)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }

    /// Open requests scheduled on or after `from`, soonest first.
    pub async fn find_open_from<'e, E: PgExecutor<'e>>(
        from: NaiveDate,
        dog_size: Option<DogSize>,
        executor: E,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM walk_requests
             WHERE status = 'open'
               AND scheduled_date >= $1
               AND ($2::dog_size IS NULL OR dog_size = $2)
             ORDER BY scheduled_date ASC, start_time ASC, id ASC",
        )
        .bind(from)
        .bind(dog_size)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<()> {
        sqlx::query(
            "INSERT INTO walk_requests (
                id, owner_id, dog_id, dog_size,
                scheduled_date, start_time, duration_minutes,
                latitude, longitude, zone, notes,
                suggested_price, status, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(self.id)
        .bind(self.owner_id)
        .bind(self.dog_id)
        .bind(self.dog_size)
        .bind(self.scheduled_date)
        .bind(self.start_time)
        .bind(self.duration_minutes)
        .bind(self.latitude)
        .bind(self.longitude)
        .bind(&self.zone)
        .bind(&self.notes)
        .bind(self.suggested_price)
        .bind(self.status)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Writes back every mutable column. Identity and ownership never change.
    pub async fn update<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<()> {
        sqlx::query(
            "UPDATE walk_requests SET
                scheduled_date = $2,
                start_time = $3,
                duration_minutes = $4,
                latitude = $5,
                longitude = $6,
                zone = $7,
                notes = $8,
                suggested_price = $9,
                status = $10,
                updated_at = $11
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(self.scheduled_date)
        .bind(self.start_time)
        .bind(self.duration_minutes)
        .bind(self.latitude)
        .bind(self.longitude)
        .bind(&self.zone)
        .bind(&self.notes)
        .bind(self.suggested_price)
        .bind(self.status)
        .bind(self.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete<'e, E: PgExecutor<'e>>(id: RequestId, executor: E) -> Result<()> {
        sqlx::query("DELETE FROM walk_requests WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
