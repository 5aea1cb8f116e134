use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use crate::common::utils::GeoPoint;
use crate::common::{AssignmentId, RoutePointId};

/// One persisted sample of a walk's route. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoutePoint {
    pub id: RoutePointId,
    pub assignment_id: AssignmentId,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
    pub recorded_at: DateTime<Utc>,
}

impl RoutePoint {
    pub fn new(
        assignment_id: AssignmentId,
        point: GeoPoint,
        accuracy_meters: f64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RoutePointId::new(),
            assignment_id,
            latitude: point.latitude,
            longitude: point.longitude,
            accuracy_meters,
            recorded_at,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

// =============================================================================
// SQL
// =============================================================================

impl RoutePoint {
    pub async fn insert<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<()> {
        sqlx::query(
            "INSERT INTO route_points (id, assignment_id, latitude, longitude, accuracy_meters, recorded_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(self.id)
        .bind(self.assignment_id)
        .bind(self.latitude)
        .bind(self.longitude)
        .bind(self.accuracy_meters)
        .bind(self.recorded_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Oldest first.
    pub async fn find_by_assignment<'e, E: PgExecutor<'e>>(
        assignment_id: AssignmentId,
        executor: E,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM route_points WHERE assignment_id = $1 ORDER BY recorded_at ASC, id ASC",
        )
        .bind(assignment_id)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn find_last<'e, E: PgExecutor<'e>>(
        assignment_id: AssignmentId,
        executor: E,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM route_points WHERE assignment_id = $1
             ORDER BY recorded_at DESC, id DESC
             LIMIT 1",
        )
        .bind(assignment_id)
        .fetch_optional(executor)
        .await
        .map_err(Into::into)
    }
}
