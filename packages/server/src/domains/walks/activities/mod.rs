use rust_decimal::Decimal;

use crate::domains::walks::errors::{WalkError, WalkResult};

pub mod assignments;
pub mod offers;
pub mod requests;

pub use assignments::{
    cancel_assignment, complete_assignment, get_assignment, get_assignment_for_request, mark_paid,
    start_assignment, WalkReport,
};
pub use offers::{
    accept_offer, list_request_offers, list_walker_offers, reject_offer, submit_offer, SubmitOffer,
};
pub use requests::{
    cancel_request, create_request, delete_request, get_request, list_owner_requests,
    update_request, CreateWalkRequest, DeleteOutcome, UpdateWalkRequest,
};

/// Decimal places stored for every money column.
pub const MONEY_SCALE: u32 = 2;

/// Prices must be positive and expressible in whole cents.
pub(crate) fn validate_price(field: &str, price: Decimal) -> WalkResult<()> {
    if price <= Decimal::ZERO {
        return Err(WalkError::validation(format!("{field} must be greater than zero")));
    }
    if price.normalize().scale() > MONEY_SCALE {
        return Err(WalkError::validation(format!(
            "{field} cannot have more than {MONEY_SCALE} decimal places"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_must_be_positive_whole_cents() {
        assert!(validate_price("price", Decimal::new(14050, 2)).is_ok());
        assert!(validate_price("price", Decimal::new(1400000, 4)).is_ok());
        assert!(validate_price("price", Decimal::new(140555, 3)).is_err());
        assert!(validate_price("price", Decimal::ZERO).is_err());
        assert!(validate_price("price", Decimal::new(-5, 0)).is_err());
    }
}
