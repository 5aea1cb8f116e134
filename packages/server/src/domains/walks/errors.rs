use serde::Serialize;
use thiserror::Error;

use crate::common::AuthError;

/// Coarse error classes callers act on.
///
/// `Conflict` means "someone else already acted" (or the caller is out of
/// date) and is expected under races; only `Internal` indicates a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    BusinessRule,
    Internal,
}

/// Errors raised by walk lifecycle, matching, tracking and settlement
/// activities.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Walker is not verified")]
    NotEligible,

    #[error("Walker has been blocked by the owner")]
    Blocked,

    #[error("Walk request is not open for offers")]
    NotOpen,

    #[error("Walk request is no longer open")]
    RequestNoLongerOpen,

    #[error("Walker already has an offer on this request")]
    DuplicateOffer,

    #[error("Offer is {0}, not PENDING")]
    OfferNotPending(String),

    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Assignment is {0}; only COMPLETED walks can be marked paid")]
    NotCompleted(String),

    #[error("Payment already marked as paid")]
    AlreadyPaid,

    #[error("Assignment is {0}; location samples are only accepted while IN_PROGRESS")]
    AssignmentNotTrackable(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl WalkError {
    pub fn validation(message: impl Into<String>) -> Self {
        WalkError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        WalkError::Forbidden(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WalkError::Validation(_) => ErrorKind::Validation,
            WalkError::NotFound(_) => ErrorKind::NotFound,
            WalkError::Forbidden(_) => ErrorKind::Forbidden,
            WalkError::NotEligible | WalkError::Blocked => ErrorKind::BusinessRule,
            WalkError::NotOpen
            | WalkError::RequestNoLongerOpen
            | WalkError::DuplicateOffer
            | WalkError::OfferNotPending(_)
            | WalkError::InvalidTransition { .. }
            | WalkError::NotCompleted(_)
            | WalkError::AlreadyPaid
            | WalkError::AssignmentNotTrackable(_) => ErrorKind::Conflict,
            WalkError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

impl From<AuthError> for WalkError {
    fn from(err: AuthError) -> Self {
        WalkError::Forbidden(err.to_string())
    }
}

pub type WalkResult<T> = Result<T, WalkError>;
