//! Pure visibility rules for open walk requests.
//!
//! These functions contain NO side effects. A request is visible to a walker
//! when, in priority order:
//! 1. the walker searched for something: its zone label contains the search
//!    text (case-insensitive);
//! 2. the walker has a home point: its point lies in the bounding box around
//!    home, OR its zone label contains the walker's base zone or city;
//! 3. otherwise: its zone label contains the walker's base zone or city.
//!
//! The OR in rule 2 lets a request with no point (or a far-away point) match
//! on its label alone.

use chrono::NaiveDate;
use serde::Serialize;

use crate::common::utils::{distance_km, zone_contains, BoundingBox};
use crate::domains::walks::models::{DogSize, RequestStatus, WalkRequest};
use crate::kernel::WalkerPreferences;

/// Which rule decides visibility for a given walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Search,
    Radius,
    Zone,
}

/// An open request as a walker sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleRequest {
    #[serde(flatten)]
    pub request: WalkRequest,
    /// Haversine distance from the walker's home, when both points exist.
    pub distance_km: Option<f64>,
}

pub fn rule_for(prefs: &WalkerPreferences, search: Option<&str>) -> MatchRule {
    if search.is_some_and(|s| !s.trim().is_empty()) {
        MatchRule::Search
    } else if prefs.home_point().is_some() {
        MatchRule::Radius
    } else {
        MatchRule::Zone
    }
}

fn matches_walker_area(request: &WalkRequest, prefs: &WalkerPreferences) -> bool {
    let label = request.zone.as_deref();
    prefs
        .base_zone
        .as_deref()
        .is_some_and(|zone| zone_contains(label, zone))
        || prefs
            .city
            .as_deref()
            .is_some_and(|city| zone_contains(label, city))
}

/// Location rules only; status, date and size are checked by [`filter_visible`].
pub fn is_nearby(request: &WalkRequest, prefs: &WalkerPreferences, search: Option<&str>) -> bool {
    match rule_for(prefs, search) {
        MatchRule::Search => zone_contains(request.zone.as_deref(), search.unwrap_or_default()),
        MatchRule::Radius => {
            let in_box = match (prefs.home_point(), request.point()) {
                (Some(home), Some(point)) => BoundingBox::around(home, prefs.radius_km()).contains(point),
                _ => false,
            };
            in_box || matches_walker_area(request, prefs)
        }
        MatchRule::Zone => matches_walker_area(request, prefs),
    }
}

/// Applies every visibility rule and orders the result by date, then start time.
pub fn filter_visible(
    requests: Vec<WalkRequest>,
    prefs: &WalkerPreferences,
    search: Option<&str>,
    dog_size: Option<DogSize>,
    today: NaiveDate,
) -> Vec<VisibleRequest> {
    let home = prefs.home_point();

    let mut visible: Vec<VisibleRequest> = requests
        .into_iter()
        .filter(|r| r.status == RequestStatus::Open)
        .filter(|r| r.scheduled_date >= today)
        .filter(|r| dog_size.map_or(true, |size| r.dog_size == Some(size)))
        .filter(|r| is_nearby(r, prefs, search))
        .map(|request| {
            let distance_km = match (home, request.point()) {
                (Some(home), Some(point)) => Some(distance_km(home, point)),
                _ => None,
            };
            VisibleRequest {
                request,
                distance_km,
            }
        })
        .collect();

    visible.sort_by(|a, b| {
        a.request
            .scheduled_date
            .cmp(&b.request.scheduled_date)
            .then(a.request.start_time.cmp(&b.request.start_time))
    });
    visible
}
