// HTTP routes
pub mod admin;
pub mod assignments;
pub mod health;
pub mod offers;
pub mod payments;
pub mod requests;
pub mod tracking;

pub use health::*;
