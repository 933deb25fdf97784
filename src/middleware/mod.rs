pub mod auth;
pub mod rate_limit;

pub use auth::{ErrorResponse, require_session_from_headers};
