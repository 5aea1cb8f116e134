//! Walk lifecycle: requests, the offer ledger and assignments.

pub mod activities;
pub mod errors;
pub mod events;
pub mod models;
pub mod store;

pub use errors::{ErrorKind, WalkError, WalkResult};
pub use events::WalkEvent;
pub use store::{MemoryWalkStore, PostgresWalkStore, WalkStore, WalkTx};
