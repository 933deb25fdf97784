use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::codes::model::CODE_LENGTH;
use crate::codes::{CodeError, Validation};
use crate::middleware::rate_limit::{
    GENERATE_LIMIT_PER_MINUTE, RATE_LIMIT_WINDOW_SECONDS, VALIDATE_LIMIT_PER_MINUTE,
    check_rate_limit, rate_limit_key,
};
use crate::middleware::{ErrorResponse, require_session_from_headers};

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct GenerateCodeRequest {
    pub organization_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct GenerateCodeResponse {
    pub code: String,
    pub expiration_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateCodeRequest {
    #[serde(deserialize_with = "validate_code_format")]
    pub code: String,
}

// Custom deserializer: reject anything that cannot be a code before it
// reaches the service.
fn validate_code_format<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let code = String::deserialize(deserializer)?;
    let code = code.trim().to_string();

    if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(serde::de::Error::custom(format!(
            "Code must be exactly {} digits",
            CODE_LENGTH
        )));
    }

    Ok(code)
}

// ============================================
// Helpers
// ============================================

/// Fixed-window per-user limit. Redis being down fails open with a warning
/// rather than blocking checkpoint traffic.
async fn enforce_rate_limit(
    state: &AppState,
    scope: &str,
    user_id: Uuid,
    max_requests: u32,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let mut redis_conn = state.redis.clone();
    let key = rate_limit_key(scope, user_id);

    match check_rate_limit(&mut redis_conn, &key, max_requests, RATE_LIMIT_WINDOW_SECONDS).await {
        Ok((true, _, _)) => Ok(()),
        Ok((false, _, reset_seconds)) => Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new(
                format!(
                    "Rate limit exceeded. Try again in {} seconds.",
                    reset_seconds
                ),
                "RATE_LIMITED",
            )),
        )),
        Err(e) => {
            tracing::warn!("Rate limit check failed, allowing request: {}", e);
            Ok(())
        }
    }
}

// ============================================
// Handlers
// ============================================

/// Issue a fresh access code for the caller's membership in an organization.
///
/// **Auth: Session Required**
pub async fn generate_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GenerateCodeRequest>,
) -> Result<Json<GenerateCodeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = require_session_from_headers(&state.db, &headers).await?;

    enforce_rate_limit(&state, "qr:generate", user.user_id, GENERATE_LIMIT_PER_MINUTE).await?;

    let code = state
        .codes
        .generate_code(user.user_id, req.organization_id)
        .await
        .map_err(|err| match err {
            CodeError::NotAMember => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(err.to_string(), "NOT_A_MEMBER")),
            ),
            CodeError::MemberNotActive { .. } => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(err.to_string(), "MEMBER_NOT_ACTIVE")),
            ),
            CodeError::AccessDenied(_) => (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new(err.to_string(), "ACCESS_DENIED")),
            ),
            CodeError::Store(e) => {
                tracing::error!("Failed to issue access code: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Failed to issue access code", "DB_ERROR")),
                )
            }
        })?;

    Ok(Json(GenerateCodeResponse {
        code: code.code,
        expiration_time: code.expires_at,
    }))
}

/// Redeem a scanned access code on behalf of a checkpoint validator.
///
/// 200 when the code is accepted, 422 when the service rejects it softly
/// (unknown, expired, or already-used code; vanished subject), 403 when the
/// caller is not allowed to redeem at all.
///
/// **Auth: Session Required**
pub async fn validate_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ValidateCodeRequest>,
) -> Result<(StatusCode, Json<Validation>), (StatusCode, Json<ErrorResponse>)> {
    let user = require_session_from_headers(&state.db, &headers).await?;

    enforce_rate_limit(&state, "qr:validate", user.user_id, VALIDATE_LIMIT_PER_MINUTE).await?;

    match state.codes.validate_code(&req.code, user.user_id).await {
        Ok(outcome) => {
            let status = if outcome.valid {
                StatusCode::OK
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            Ok((status, Json(outcome)))
        }
        Err(CodeError::AccessDenied(msg)) => {
            tracing::warn!(redeemer = %user.email, "Access denied during code redemption");
            Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new(msg, "ACCESS_DENIED")),
            ))
        }
        Err(CodeError::Store(e)) => {
            tracing::error!("Failed to validate access code: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to validate access code", "DB_ERROR")),
            ))
        }
        Err(other) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(other.to_string(), "INVALID_REQUEST")),
        )),
    }
}
