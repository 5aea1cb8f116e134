//! Caller identity for the walk engine.
//!
//! The identity service authenticates members and tells us their role; the
//! server turns a verified token into an [`Actor`] and every activity takes
//! one as its first argument.

mod actor;
mod errors;

pub use actor::{Actor, Role};
pub use errors::AuthError;
