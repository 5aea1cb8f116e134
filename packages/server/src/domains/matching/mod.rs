pub mod activities;
pub mod filter;

pub use activities::{list_visible_requests, VisibleRequestQuery};
pub use filter::{filter_visible, MatchRule, VisibleRequest};
