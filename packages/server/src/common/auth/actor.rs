use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::common::MemberId;

/// Role claimed by an authenticated member, as issued by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Walker,
    Operator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Walker => "WALKER",
            Role::Operator => "OPERATOR",
        }
    }
}

/// The authenticated caller of an engine operation.
///
/// Ownership checks ("is this the request's owner") happen in the domain
/// activities against stored rows; `Actor` only answers role questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub member_id: MemberId,
    pub role: Role,
}

impl Actor {
    pub fn new(member_id: MemberId, role: Role) -> Self {
        Self { member_id, role }
    }

    pub fn owner(member_id: MemberId) -> Self {
        Self::new(member_id, Role::Owner)
    }

    pub fn walker(member_id: MemberId) -> Self {
        Self::new(member_id, Role::Walker)
    }

    pub fn operator(member_id: MemberId) -> Self {
        Self::new(member_id, Role::Operator)
    }

    pub fn require(&self, role: Role) -> Result<(), AuthError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AuthError::RoleRequired(role.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_matches_exact_role() {
        let walker = Actor::walker(MemberId::new());
        assert!(walker.require(Role::Walker).is_ok());
        assert_eq!(
            walker.require(Role::Operator),
            Err(AuthError::RoleRequired("OPERATOR"))
        );
    }

    #[test]
    fn role_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Operator).unwrap(), "\"OPERATOR\"");
        let role: Role = serde_json::from_str("\"WALKER\"").unwrap();
        assert_eq!(role, Role::Walker);
    }
}
