//! Live location ingestion for walks in progress.

pub mod activities;
pub mod registry;
pub mod session;

pub use activities::{get_route, record_location, RouteSummary};
pub use registry::TrackingSessions;
pub use session::{Disposition, LocationSample, SampleOutcome, SignalQuality, TrackingSession};
