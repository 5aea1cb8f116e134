//! Status enums for requests, offers and assignments, and the one table that
//! decides which transitions between them are legal.
//!
//! Activities never compare statuses by hand before writing; they call
//! [`ensure_transition`], which is the only gate on a status change.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domains::walks::errors::WalkError;

/// A status type with a fixed transition table.
pub trait Lifecycle: Copy + Eq + fmt::Debug + fmt::Display {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn can_transition_to(self, next: Self) -> bool;

    fn is_terminal(self) -> bool;
}

/// Returns `InvalidTransition` unless `from -> to` is in the table.
pub fn ensure_transition<S: Lifecycle>(from: S, to: S) -> Result<(), WalkError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(WalkError::InvalidTransition {
            entity: S::ENTITY,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

// ============================================================================
// WalkRequest
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "walk_request_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl Lifecycle for RequestStatus {
    const ENTITY: &'static str = "walk request";

    fn can_transition_to(self, next: Self) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Open, Assigned)
                | (Open, Cancelled)
                | (Assigned, InProgress)
                | (Assigned, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestStatus::Open => "OPEN",
            RequestStatus::Assigned => "ASSIGNED",
            RequestStatus::InProgress => "IN_PROGRESS",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Cancelled => "CANCELLED",
        })
    }
}

// ============================================================================
// Offer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl Lifecycle for OfferStatus {
    const ENTITY: &'static str = "offer";

    fn can_transition_to(self, next: Self) -> bool {
        use OfferStatus::*;
        matches!((self, next), (Pending, Accepted) | (Pending, Rejected))
    }

    fn is_terminal(self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OfferStatus::Pending => "PENDING",
            OfferStatus::Accepted => "ACCEPTED",
            OfferStatus::Rejected => "REJECTED",
        })
    }
}

// ============================================================================
// WalkAssignment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl Lifecycle for AssignmentStatus {
    const ENTITY: &'static str = "walk assignment";

    fn can_transition_to(self, next: Self) -> bool {
        use AssignmentStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Cancelled)
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssignmentStatus::Pending => "PENDING",
            AssignmentStatus::InProgress => "IN_PROGRESS",
            AssignmentStatus::Completed => "COMPLETED",
            AssignmentStatus::Cancelled => "CANCELLED",
        })
    }
}

// ============================================================================
// Settlement flags
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "platform_fee_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeStatus {
    Due,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// Which side of the walk cancelled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cancel_party", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelParty {
    Owner,
    Walker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "dog_size", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DogSize {
    Small,
    Medium,
    Large,
    Giant,
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST_STATES: [RequestStatus; 5] = [
        RequestStatus::Open,
        RequestStatus::Assigned,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    const ASSIGNMENT_STATES: [AssignmentStatus; 4] = [
        AssignmentStatus::Pending,
        AssignmentStatus::InProgress,
        AssignmentStatus::Completed,
        AssignmentStatus::Cancelled,
    ];

    #[test]
    fn terminal_states_have_no_exits() {
        for from in REQUEST_STATES.into_iter().filter(|s| s.is_terminal()) {
            for to in REQUEST_STATES {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
        for from in ASSIGNMENT_STATES.into_iter().filter(|s| s.is_terminal()) {
            for to in ASSIGNMENT_STATES {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
        for to in [OfferStatus::Pending, OfferStatus::Accepted, OfferStatus::Rejected] {
            assert!(!OfferStatus::Accepted.can_transition_to(to));
            assert!(!OfferStatus::Rejected.can_transition_to(to));
        }
    }

    #[test]
    fn request_cannot_skip_or_reverse() {
        assert!(!RequestStatus::Open.can_transition_to(RequestStatus::InProgress));
        assert!(!RequestStatus::Open.can_transition_to(RequestStatus::Completed));
        assert!(!RequestStatus::Assigned.can_transition_to(RequestStatus::Open));
        assert!(!RequestStatus::InProgress.can_transition_to(RequestStatus::Assigned));
        assert!(!RequestStatus::Assigned.can_transition_to(RequestStatus::Completed));
    }

    #[test]
    fn assignment_forward_path() {
        assert!(AssignmentStatus::Pending.can_transition_to(AssignmentStatus::InProgress));
        assert!(AssignmentStatus::InProgress.can_transition_to(AssignmentStatus::Completed));
        assert!(!AssignmentStatus::Pending.can_transition_to(AssignmentStatus::Completed));
        assert!(AssignmentStatus::Pending.can_transition_to(AssignmentStatus::Cancelled));
        assert!(AssignmentStatus::InProgress.can_transition_to(AssignmentStatus::Cancelled));
    }

    #[test]
    fn ensure_transition_reports_both_ends() {
        let err = ensure_transition(AssignmentStatus::Completed, AssignmentStatus::Completed)
            .unwrap_err();
        match err {
            WalkError::InvalidTransition { entity, from, to } => {
                assert_eq!(entity, "walk assignment");
                assert_eq!(from, "COMPLETED");
                assert_eq!(to, "COMPLETED");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn statuses_serialize_screaming_case() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(serde_json::to_string(&DogSize::Medium).unwrap(), "\"MEDIUM\"");
    }
}
