//! Walker earnings and platform fee bookkeeping.

pub mod activities;
pub mod summary;

pub use activities::{settle_fees, walker_earnings, EarningsQuery, WalkerEarnings};
pub use summary::{EarningsLine, EarningsSummary};
