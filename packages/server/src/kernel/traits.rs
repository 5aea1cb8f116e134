// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The walk engine decides what to ask; these traits only know how to ask it.
//
// Naming convention: Base* for trait names (e.g., BaseMemberDirectory, BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::utils::GeoPoint;
use crate::common::{DogId, MemberId};
use crate::domains::walks::models::DogSize;

/// Service radius used when a walker has a home point but never set one.
pub const DEFAULT_SERVICE_RADIUS_KM: f64 = 5.0;

// =============================================================================
// Member Directory Trait (Identity / profile service)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

/// Where a walker is willing to work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkerPreferences {
    pub home_latitude: Option<f64>,
    pub home_longitude: Option<f64>,
    pub service_radius_km: Option<f64>,
    pub base_zone: Option<String>,
    pub city: Option<String>,
}

impl WalkerPreferences {
    pub fn home_point(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.home_latitude, self.home_longitude)
    }

    pub fn radius_km(&self) -> f64 {
        self.service_radius_km
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_SERVICE_RADIUS_KM)
    }
}

#[async_trait]
pub trait BaseMemberDirectory: Send + Sync {
    async fn verification_status(&self, member_id: MemberId) -> Result<VerificationStatus>;

    async fn walker_preferences(&self, walker_id: MemberId) -> Result<WalkerPreferences>;

    /// True if `owner_id` has blocked `walker_id`.
    async fn is_blocked(&self, owner_id: MemberId, walker_id: MemberId) -> Result<bool>;

    async fn update_last_location(
        &self,
        walker_id: MemberId,
        point: GeoPoint,
        recorded_at: DateTime<Utc>,
    ) -> Result<()>;
}

// =============================================================================
// Dog Registry Trait (Dog-profile service)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogProfile {
    pub id: DogId,
    pub owner_id: MemberId,
    pub size: Option<DogSize>,
}

#[async_trait]
pub trait BaseDogRegistry: Send + Sync {
    async fn find_dog(&self, dog_id: DogId) -> Result<Option<DogProfile>>;
}

// =============================================================================
// Notifier Trait (fire-and-forget delivery)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub recipient_id: MemberId,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

// =============================================================================
// Clock Trait
// =============================================================================

pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Start of the matching window for "not in the past" filters.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock. `today` uses the server's local date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl BaseClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
