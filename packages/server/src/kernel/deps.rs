//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by every domain
//! activity. The store and all external services sit behind trait objects so
//! tests can swap in the in-memory store and mocks.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::domains::tracking::TrackingSessions;
use crate::domains::walks::store::WalkStore;
use crate::kernel::{BaseClock, BaseDogRegistry, BaseMemberDirectory, BaseNotifier, EventHub};

/// Server dependencies accessible to activities and HTTP handlers.
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn WalkStore>,
    pub directory: Arc<dyn BaseMemberDirectory>,
    pub dogs: Arc<dyn BaseDogRegistry>,
    /// Consumed by the notification dispatcher, never called inline.
    pub notifier: Arc<dyn BaseNotifier>,
    pub clock: Arc<dyn BaseClock>,
    /// In-process pub/sub hub for post-commit walk events
    pub events: EventHub,
    /// Live tracking state per IN_PROGRESS assignment
    pub tracking: TrackingSessions,
    /// Fraction of the agreed price charged at completion, e.g. 0.10
    pub platform_fee_rate: Decimal,
    /// JWT service for token verification
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn WalkStore>,
        directory: Arc<dyn BaseMemberDirectory>,
        dogs: Arc<dyn BaseDogRegistry>,
        notifier: Arc<dyn BaseNotifier>,
        clock: Arc<dyn BaseClock>,
        events: EventHub,
        platform_fee_rate: Decimal,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            store,
            directory,
            dogs,
            notifier,
            clock,
            events,
            tracking: TrackingSessions::default(),
            platform_fee_rate,
            jwt_service,
        }
    }
}
