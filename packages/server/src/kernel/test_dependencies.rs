// TestDependencies - mock implementations for testing
//
// Provides mock collaborators, a manual clock and the in-memory store, wired
// into a ServerDeps for activity and HTTP tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::{
    BaseClock, BaseDogRegistry, BaseMemberDirectory, BaseNotifier, DogProfile, EventHub,
    Notification, ServerDeps, VerificationStatus, WalkerPreferences,
};
use crate::common::utils::GeoPoint;
use crate::common::{DogId, MemberId};
use crate::domains::auth::JwtService;
use crate::domains::walks::models::DogSize;
use crate::domains::walks::store::MemoryWalkStore;

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "walks-test";

// =============================================================================
// Mock Member Directory
// =============================================================================

/// Location update captured from tracking
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    pub walker_id: MemberId,
    pub point: GeoPoint,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MockMemberDirectory {
    verification: Mutex<HashMap<MemberId, VerificationStatus>>,
    preferences: Mutex<HashMap<MemberId, WalkerPreferences>>,
    blocks: Mutex<HashSet<(MemberId, MemberId)>>,
    location_updates: Mutex<Vec<LocationUpdate>>,
    fail_location_updates: Mutex<bool>,
}

impl MockMemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_verification(&self, member_id: MemberId, status: VerificationStatus) {
        self.verification.lock().unwrap().insert(member_id, status);
    }

    /// Shorthand for a VERIFIED walker
    pub fn verify(&self, member_id: MemberId) {
        self.set_verification(member_id, VerificationStatus::Verified);
    }

    pub fn set_preferences(&self, walker_id: MemberId, prefs: WalkerPreferences) {
        self.preferences.lock().unwrap().insert(walker_id, prefs);
    }

    pub fn block(&self, owner_id: MemberId, walker_id: MemberId) {
        self.blocks.lock().unwrap().insert((owner_id, walker_id));
    }

    /// Make every last-location update fail
    pub fn fail_location_updates(&self) {
        *self.fail_location_updates.lock().unwrap() = true;
    }

    /// Get all last-location updates received so far
    pub fn location_updates(&self) -> Vec<LocationUpdate> {
        self.location_updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseMemberDirectory for MockMemberDirectory {
    async fn verification_status(&self, member_id: MemberId) -> Result<VerificationStatus> {
        Ok(self
            .verification
            .lock()
            .unwrap()
            .get(&member_id)
            .copied()
            .unwrap_or(VerificationStatus::Unverified))
    }

    async fn walker_preferences(&self, walker_id: MemberId) -> Result<WalkerPreferences> {
        Ok(self
            .preferences
            .lock()
            .unwrap()
            .get(&walker_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn is_blocked(&self, owner_id: MemberId, walker_id: MemberId) -> Result<bool> {
        Ok(self.blocks.lock().unwrap().contains(&(owner_id, walker_id)))
    }

    async fn update_last_location(
        &self,
        walker_id: MemberId,
        point: GeoPoint,
        recorded_at: DateTime<Utc>,
    ) -> Result<()> {
        if *self.fail_location_updates.lock().unwrap() {
            anyhow::bail!("directory unavailable");
        }
        self.location_updates.lock().unwrap().push(LocationUpdate {
            walker_id,
            point,
            recorded_at,
        });
        Ok(())
    }
}

// =============================================================================
// Mock Dog Registry
// =============================================================================

#[derive(Default)]
pub struct MockDogRegistry {
    dogs: Mutex<HashMap<DogId, DogProfile>>,
}

impl MockDogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dog and return its id
    pub fn add_dog(&self, owner_id: MemberId, size: Option<DogSize>) -> DogId {
        let id = DogId::new();
        self.dogs.lock().unwrap().insert(
            id,
            DogProfile {
                id,
                owner_id,
                size,
            },
        );
        id
    }
}

#[async_trait]
impl BaseDogRegistry for MockDogRegistry {
    async fn find_dog(&self, dog_id: DogId) -> Result<Option<DogProfile>> {
        Ok(self.dogs.lock().unwrap().get(&dog_id).cloned())
    }
}

// =============================================================================
// Mock Notifier
// =============================================================================

#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: Mutex<bool>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery fail
    pub fn fail_all(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Get all notifications delivered so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    /// Check if a member received a notification of the given kind
    pub fn was_notified(&self, recipient_id: MemberId, kind: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .any(|n| n.recipient_id == recipient_id && n.kind == kind)
    }
}

#[async_trait]
impl BaseNotifier for MockNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("notification service unavailable");
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// =============================================================================
// Manual Clock
// =============================================================================

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap() = at;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Default for ManualClock {
    /// 2026-05-01 09:00 UTC
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap())
    }
}

impl BaseClock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<MemoryWalkStore>,
    pub directory: Arc<MockMemberDirectory>,
    pub dogs: Arc<MockDogRegistry>,
    pub notifier: Arc<MockNotifier>,
    pub clock: Arc<ManualClock>,
    pub platform_fee_rate: Decimal,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryWalkStore::new()),
            directory: Arc::new(MockMemberDirectory::new()),
            dogs: Arc::new(MockDogRegistry::new()),
            notifier: Arc::new(MockNotifier::new()),
            clock: Arc::new(ManualClock::default()),
            platform_fee_rate: Decimal::new(10, 2),
        }
    }

    /// Set the platform fee rate
    pub fn fee_rate(mut self, rate: Decimal) -> Self {
        self.platform_fee_rate = rate;
        self
    }

    /// Set the starting time of the manual clock
    pub fn starting_at(mut self, at: DateTime<Utc>) -> Self {
        self.clock = Arc::new(ManualClock::new(at));
        self
    }

    pub fn jwt_service() -> JwtService {
        JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())
    }

    /// Convert into ServerDeps for testing
    pub fn into_server_deps(self) -> ServerDeps {
        ServerDeps::new(
            self.store,
            self.directory,
            self.dogs,
            self.notifier,
            self.clock,
            EventHub::new(),
            self.platform_fee_rate,
            Arc::new(Self::jwt_service()),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
