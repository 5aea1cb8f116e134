//! Auth domain - bearer token verification.
//!
//! Members authenticate with the identity service, which issues HS256 JWTs
//! carrying the member id and role. This server only verifies them.

pub mod jwt;

pub use jwt::{Claims, JwtService};
