use axum::{Router, routing::post};

use super::AppState;
use super::access_codes;

/// V1 API routes
///
/// ## Access Codes (Session Required)
/// - POST /validate/qr-code/generate - Issue a fresh code for the caller's
///   membership in the given organization
/// - POST /validate/qr-code - Redeem a scanned code (validator/admin only)
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/validate/qr-code/generate",
            post(access_codes::generate_code),
        )
        .route("/validate/qr-code", post(access_codes::validate_code))
}
