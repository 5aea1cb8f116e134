use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::session::{LocationSample, SampleOutcome, TrackingSession};
use crate::common::utils::GeoPoint;
use crate::common::AssignmentId;
use crate::domains::walks::models::RoutePoint;

/// How many recently closed assignments are remembered. Samples that passed
/// the status check just before a walk ended are refused while their id is
/// still in this window.
const CLOSED_WINDOW: usize = 1024;

#[derive(Default)]
struct Sessions {
    live: HashMap<AssignmentId, TrackingSession>,
    closed: HashSet<AssignmentId>,
    closed_order: VecDeque<AssignmentId>,
}

/// Live tracking sessions keyed by assignment. Sessions are created lazily on
/// the first sample and dropped when the walk completes or is cancelled.
#[derive(Clone, Default)]
pub struct TrackingSessions {
    inner: Arc<Mutex<Sessions>>,
}

impl TrackingSessions {
    pub async fn is_active(&self, assignment_id: AssignmentId) -> bool {
        self.inner.lock().await.live.contains_key(&assignment_id)
    }

    pub async fn active_count(&self) -> usize {
        self.inner.lock().await.live.len()
    }

    /// Runs the sample through the assignment's session. `seed` is only used
    /// when no session exists yet. Returns `None` once the session was ended.
    pub async fn evaluate(
        &self,
        assignment_id: AssignmentId,
        seed: Option<&RoutePoint>,
        sample: &LocationSample,
        now: DateTime<Utc>,
    ) -> Option<SampleOutcome> {
        let mut sessions = self.inner.lock().await;
        if sessions.closed.contains(&assignment_id) {
            return None;
        }
        let session = sessions
            .live
            .entry(assignment_id)
            .or_insert_with(|| seed.map_or_else(TrackingSession::new, TrackingSession::resume_from));
        Some(session.evaluate(sample, now))
    }

    /// Accepted points not yet written to the route.
    pub async fn buffered_points(&self, assignment_id: AssignmentId) -> Vec<GeoPoint> {
        self.inner
            .lock()
            .await
            .live
            .get(&assignment_id)
            .map(|session| session.buffered().to_vec())
            .unwrap_or_default()
    }

    /// Closes tracking for the assignment. Returns true if a live session
    /// was dropped.
    pub async fn end(&self, assignment_id: AssignmentId) -> bool {
        let mut sessions = self.inner.lock().await;
        if sessions.closed.insert(assignment_id) {
            sessions.closed_order.push_back(assignment_id);
            if sessions.closed_order.len() > CLOSED_WINDOW {
                if let Some(oldest) = sessions.closed_order.pop_front() {
                    sessions.closed.remove(&oldest);
                }
            }
        }
        sessions.live.remove(&assignment_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(latitude: f64) -> LocationSample {
        LocationSample {
            latitude,
            longitude: -99.1332,
            accuracy_meters: 10.0,
            recorded_at: Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn ended_session_is_not_recreated_by_a_late_sample() {
        let sessions = TrackingSessions::default();
        let id = AssignmentId::new();
        let now = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();

        assert!(sessions.evaluate(id, None, &sample(19.4326), now).await.is_some());
        assert!(sessions.end(id).await);

        assert!(sessions.evaluate(id, None, &sample(19.4327), now).await.is_none());
        assert!(!sessions.is_active(id).await);
        assert_eq!(sessions.active_count().await, 0);
        assert!(!sessions.end(id).await);
    }

    #[tokio::test]
    async fn closed_window_forgets_the_oldest_ids() {
        let sessions = TrackingSessions::default();
        let first = AssignmentId::new();
        sessions.end(first).await;
        for _ in 0..CLOSED_WINDOW {
            sessions.end(AssignmentId::new()).await;
        }

        let inner = sessions.inner.lock().await;
        assert_eq!(inner.closed.len(), CLOSED_WINDOW);
        assert!(!inner.closed.contains(&first));
    }
}
