// Walk Marketplace - API Core
//
// Backend for owners posting dog-walk requests, walkers bidding on them,
// live route tracking and fee settlement. Business logic lives per-domain in
// domains/*/activities; infrastructure lives in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
