use axum::{Json, extract::State};
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceStatus,
}

#[derive(Serialize)]
pub struct ServiceStatus {
    pub database: bool,
    pub redis: bool,
}

#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

/// Lightweight liveness probe for Docker healthchecks.
/// Returns 200 immediately — no DB or Redis calls.
/// Use `/health` for the full diagnostic check.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

/// Full health check — queries database and Redis.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut redis_conn = state.redis.clone();

    let ping_cmd = redis::cmd("PING");
    let (db_result, redis_result) = tokio::join!(
        sqlx::query("SELECT 1").fetch_one(&state.db),
        ping_cmd.query_async::<String>(&mut redis_conn),
    );

    let db_healthy = db_result.is_ok();
    let redis_healthy = redis_result.is_ok();
    let all_healthy = db_healthy && redis_healthy;

    Json(HealthResponse {
        status: if all_healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        services: ServiceStatus {
            database: db_healthy,
            redis: redis_healthy,
        },
    })
}
