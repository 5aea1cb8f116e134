//! Per-assignment noise filter for live location samples.
//!
//! Policy, applied in order to each sample:
//! 1. accuracy worse than 60 m is rejected outright;
//! 2. a step under 4 m from the last accepted point is jitter, over 300 m is
//!    a glitch, and both are discarded;
//! 3. anything else joins the local route, and is persisted if at least 7 s
//!    of server time passed since the last persisted point.
//!
//! Signal quality is classified for every sample, rejected ones included.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::common::utils::{distance_meters, GeoPoint};
use crate::domains::walks::models::RoutePoint;

pub const MAX_ACCEPTED_ACCURACY_METERS: f64 = 60.0;
pub const POOR_SIGNAL_ABOVE_METERS: f64 = 100.0;
pub const EXCELLENT_SIGNAL_BELOW_METERS: f64 = 40.0;
pub const MIN_STEP_METERS: f64 = 4.0;
pub const MAX_STEP_METERS: f64 = 300.0;
pub const PERSIST_INTERVAL_SECS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalQuality {
    Poor,
    Good,
    Excellent,
}

impl SignalQuality {
    pub fn classify(accuracy_meters: f64) -> Self {
        if accuracy_meters > POOR_SIGNAL_ABOVE_METERS {
            SignalQuality::Poor
        } else if accuracy_meters < EXCELLENT_SIGNAL_BELOW_METERS {
            SignalQuality::Excellent
        } else {
            SignalQuality::Good
        }
    }
}

/// A raw reading from the walker's device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
    pub recorded_at: DateTime<Utc>,
}

impl LocationSample {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.point().is_valid() {
            return Err("coordinates out of range");
        }
        if !self.accuracy_meters.is_finite() || self.accuracy_meters < 0.0 {
            return Err("accuracy must be a non-negative number of meters");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    RejectedLowAccuracy,
    DiscardedJitter,
    DiscardedGlitch,
    /// Accepted into the local route, not yet due for persistence.
    Buffered,
    Persisted,
}

impl Disposition {
    pub fn is_accepted(self) -> bool {
        matches!(self, Disposition::Buffered | Disposition::Persisted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleOutcome {
    pub quality: SignalQuality,
    pub disposition: Disposition,
    /// Distance from the previous accepted point, when there was one.
    pub step_meters: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct TrackingSession {
    last_accepted: Option<GeoPoint>,
    last_persisted_at: Option<DateTime<Utc>>,
    /// Accepted since the last persist, oldest first.
    buffered: Vec<GeoPoint>,
}

impl TrackingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session rebuilt after a restart. The next accepted sample persists
    /// immediately because the previous persist time is unknown.
    pub fn resume_from(last: &RoutePoint) -> Self {
        Self {
            last_accepted: Some(last.point()),
            last_persisted_at: None,
            buffered: Vec::new(),
        }
    }

    pub fn last_accepted(&self) -> Option<GeoPoint> {
        self.last_accepted
    }

    pub fn buffered(&self) -> &[GeoPoint] {
        &self.buffered
    }

    /// Applies the filter policy. `now` is server time, not sample time.
    pub fn evaluate(&mut self, sample: &LocationSample, now: DateTime<Utc>) -> SampleOutcome {
        let quality = SignalQuality::classify(sample.accuracy_meters);

        if sample.accuracy_meters > MAX_ACCEPTED_ACCURACY_METERS {
            return SampleOutcome {
                quality,
                disposition: Disposition::RejectedLowAccuracy,
                step_meters: None,
            };
        }

        let point = sample.point();
        let step_meters = self.last_accepted.map(|prev| distance_meters(prev, point));

        if let Some(step) = step_meters {
            let discard = if step < MIN_STEP_METERS {
                Some(Disposition::DiscardedJitter)
            } else if step > MAX_STEP_METERS {
                Some(Disposition::DiscardedGlitch)
            } else {
                None
            };
            if let Some(disposition) = discard {
                return SampleOutcome {
                    quality,
                    disposition,
                    step_meters,
                };
            }
        }

        self.last_accepted = Some(point);

        let due = self
            .last_persisted_at
            .map_or(true, |at| now - at >= TimeDelta::seconds(PERSIST_INTERVAL_SECS));

        let disposition = if due {
            self.last_persisted_at = Some(now);
            self.buffered.clear();
            Disposition::Persisted
        } else {
            self.buffered.push(point);
            Disposition::Buffered
        };

        SampleOutcome {
            quality,
            disposition,
            step_meters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ORIGIN: GeoPoint = GeoPoint {
        latitude: 19.4326,
        longitude: -99.1332,
    };

    /// Moves `meters` due north of `from`.
    fn north(from: GeoPoint, meters: f64) -> GeoPoint {
        GeoPoint::new(from.latitude + meters / 111_195.0, from.longitude)
    }

    fn sample(point: GeoPoint, accuracy: f64) -> LocationSample {
        LocationSample {
            latitude: point.latitude,
            longitude: point.longitude,
            accuracy_meters: accuracy,
            recorded_at: t0(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn quality_bands() {
        assert_eq!(SignalQuality::classify(101.0), SignalQuality::Poor);
        assert_eq!(SignalQuality::classify(100.0), SignalQuality::Good);
        assert_eq!(SignalQuality::classify(40.0), SignalQuality::Good);
        assert_eq!(SignalQuality::classify(39.9), SignalQuality::Excellent);
    }

    #[test]
    fn inaccurate_sample_is_rejected_without_moving_state() {
        let mut session = TrackingSession::new();
        let outcome = session.evaluate(&sample(ORIGIN, 70.0), t0());

        assert_eq!(outcome.disposition, Disposition::RejectedLowAccuracy);
        assert_eq!(outcome.quality, SignalQuality::Good);
        assert!(session.last_accepted().is_none());
    }

    #[test]
    fn first_good_sample_persists() {
        let mut session = TrackingSession::new();
        let outcome = session.evaluate(&sample(ORIGIN, 30.0), t0());
        assert_eq!(outcome.disposition, Disposition::Persisted);
        assert_eq!(outcome.quality, SignalQuality::Excellent);
    }

    #[test]
    fn jitter_and_glitch_are_discarded() {
        let mut session = TrackingSession::new();
        session.evaluate(&sample(ORIGIN, 10.0), t0());

        let jitter = session.evaluate(&sample(north(ORIGIN, 2.0), 10.0), t0() + TimeDelta::seconds(10));
        assert_eq!(jitter.disposition, Disposition::DiscardedJitter);

        let glitch = session.evaluate(&sample(north(ORIGIN, 500.0), 10.0), t0() + TimeDelta::seconds(20));
        assert_eq!(glitch.disposition, Disposition::DiscardedGlitch);

        assert_eq!(session.last_accepted(), Some(ORIGIN));
        assert!(session.buffered().is_empty());
    }

    #[test]
    fn accepted_samples_are_throttled_to_one_persist_per_interval() {
        let mut session = TrackingSession::new();
        assert_eq!(
            session.evaluate(&sample(ORIGIN, 10.0), t0()).disposition,
            Disposition::Persisted
        );

        let p1 = north(ORIGIN, 10.0);
        let buffered = session.evaluate(&sample(p1, 10.0), t0() + TimeDelta::seconds(3));
        assert_eq!(buffered.disposition, Disposition::Buffered);
        assert_eq!(session.buffered(), &[p1]);

        let p2 = north(p1, 10.0);
        let persisted = session.evaluate(&sample(p2, 30.0), t0() + TimeDelta::seconds(7));
        assert_eq!(persisted.disposition, Disposition::Persisted);
        let step = persisted.step_meters.unwrap();
        assert!((step - 10.0).abs() < 0.5, "step was {step}");

        assert!(session.buffered().is_empty());
    }

    #[test]
    fn resumed_session_filters_against_last_persisted_point() {
        let last = RoutePoint::new(crate::common::AssignmentId::new(), ORIGIN, 12.0, t0());
        let mut session = TrackingSession::resume_from(&last);

        let jitter = session.evaluate(&sample(north(ORIGIN, 1.0), 10.0), t0());
        assert_eq!(jitter.disposition, Disposition::DiscardedJitter);

        let next = session.evaluate(&sample(north(ORIGIN, 20.0), 10.0), t0());
        assert_eq!(next.disposition, Disposition::Persisted);
    }

    #[test]
    fn validation_catches_bad_input() {
        let mut bad = sample(ORIGIN, 10.0);
        bad.latitude = 95.0;
        assert!(bad.validate().is_err());

        let mut negative = sample(ORIGIN, -1.0);
        assert!(negative.validate().is_err());
        negative.accuracy_meters = 0.0;
        assert!(negative.validate().is_ok());
    }
}
