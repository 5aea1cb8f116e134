use thiserror::Error;

/// Authentication / role errors raised before any domain logic runs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0} role required")]
    RoleRequired(&'static str),
}
