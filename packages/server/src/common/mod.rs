// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod id;
pub mod pagination;
pub mod utils;

pub use auth::{Actor, AuthError, Role};
pub use entity_ids::*;
pub use id::Id;
pub use pagination::{build_page_info, trim_results, Cursor, PageInfo, PaginationArgs};
