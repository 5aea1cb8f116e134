//! Earnings arithmetic over completed assignments. Pure and exact: all money
//! is `Decimal`, nothing is rounded.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::{AssignmentId, RequestId};
use crate::domains::walks::models::{FeeStatus, PaymentStatus, WalkAssignment};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EarningsSummary {
    pub walk_count: usize,
    pub gross: Decimal,
    pub paid: Decimal,
    pub unpaid: Decimal,
    pub fees_due: Decimal,
    pub fees_settled: Decimal,
    /// Gross minus every platform fee, settled or not.
    pub net: Decimal,
}

impl EarningsSummary {
    pub fn from_assignments<'a>(assignments: impl IntoIterator<Item = &'a WalkAssignment>) -> Self {
        let mut summary = Self::default();

        for assignment in assignments {
            summary.walk_count += 1;
            summary.gross += assignment.agreed_price;

            match assignment.payment_status {
                PaymentStatus::Paid => summary.paid += assignment.agreed_price,
                PaymentStatus::Unpaid => summary.unpaid += assignment.agreed_price,
            }

            let fee = assignment.platform_fee_amount.unwrap_or_default();
            match assignment.platform_fee_status {
                Some(FeeStatus::Settled) => summary.fees_settled += fee,
                Some(FeeStatus::Due) | None => summary.fees_due += fee,
            }
        }

        summary.net = summary.gross - summary.fees_due - summary.fees_settled;
        summary
    }
}

/// One completed walk in a walker's earnings statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsLine {
    pub assignment_id: AssignmentId,
    pub request_id: RequestId,
    pub completed_at: Option<DateTime<Utc>>,
    pub agreed_price: Decimal,
    pub platform_fee_amount: Decimal,
    pub platform_fee_status: Option<FeeStatus>,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub net: Decimal,
}

impl From<&WalkAssignment> for EarningsLine {
    fn from(a: &WalkAssignment) -> Self {
        let fee = a.platform_fee_amount.unwrap_or_default();
        Self {
            assignment_id: a.id,
            request_id: a.request_id,
            completed_at: a.actual_end_time,
            agreed_price: a.agreed_price,
            platform_fee_amount: fee,
            platform_fee_status: a.platform_fee_status,
            payment_status: a.payment_status,
            paid_at: a.paid_at,
            net: a.agreed_price - fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MemberId;
    use crate::domains::walks::models::AssignmentStatus;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn completed(price: &str, fee: &str, fee_status: FeeStatus, paid: bool) -> WalkAssignment {
        let at = Utc.with_ymd_and_hms(2026, 5, 2, 11, 0, 0).unwrap();
        let mut a = WalkAssignment::new(
            RequestId::new(),
            MemberId::new(),
            MemberId::new(),
            Decimal::from_str(price).unwrap(),
            at,
        );
        a.status = AssignmentStatus::Completed;
        a.actual_end_time = Some(at);
        a.platform_fee_amount = Some(Decimal::from_str(fee).unwrap());
        a.platform_fee_status = Some(fee_status);
        if paid {
            a.payment_status = PaymentStatus::Paid;
            a.paid_at = Some(at);
        }
        a
    }

    #[test]
    fn totals_split_by_payment_and_fee_status() {
        let walks = vec![
            completed("140", "14.0", FeeStatus::Due, false),
            completed("100.50", "10.050", FeeStatus::Settled, true),
            completed("90", "9.0", FeeStatus::Due, true),
        ];

        let summary = EarningsSummary::from_assignments(&walks);
        assert_eq!(summary.walk_count, 3);
        assert_eq!(summary.gross, Decimal::from_str("330.50").unwrap());
        assert_eq!(summary.paid, Decimal::from_str("190.50").unwrap());
        assert_eq!(summary.unpaid, Decimal::from(140));
        assert_eq!(summary.fees_due, Decimal::from(23));
        assert_eq!(summary.fees_settled, Decimal::from_str("10.05").unwrap());
        assert_eq!(summary.net, Decimal::from_str("297.45").unwrap());
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = EarningsSummary::from_assignments(&[]);
        assert_eq!(summary, EarningsSummary::default());
    }

    #[test]
    fn line_nets_out_the_fee() {
        let walk = completed("140", "14.0", FeeStatus::Due, false);
        let line = EarningsLine::from(&walk);
        assert_eq!(line.net, Decimal::from(126));
    }
}
