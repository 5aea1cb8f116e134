// Business domains
pub mod auth;
pub mod matching;
pub mod settlement;
pub mod tracking;
pub mod walks;
