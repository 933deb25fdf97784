use redis::AsyncCommands;
use uuid::Uuid;

/// Check rate limit for a given key
/// Returns (allowed, remaining, reset_time_seconds)
pub async fn check_rate_limit(
    redis_conn: &mut redis::aio::ConnectionManager,
    key: &str,
    max_requests: u32,
    window_seconds: u64,
) -> Result<(bool, u32, u64), redis::RedisError> {
    let cache_key = format!("ratelimit:{}", key);

    // Get current count
    let current: u32 = redis_conn.get(&cache_key).await.unwrap_or(0);

    if current >= max_requests {
        let ttl: i64 = redis_conn.ttl(&cache_key).await.unwrap_or(0);
        return Ok((false, 0, ttl.max(0) as u64));
    }

    // Increment counter
    let new_count: u32 = redis_conn.incr(&cache_key, 1).await?;

    // Set expiry on first request
    if new_count == 1 {
        let _: () = redis_conn.expire(&cache_key, window_seconds as i64).await?;
    }

    let ttl: i64 = redis_conn
        .ttl(&cache_key)
        .await
        .unwrap_or(window_seconds as i64);
    let remaining = max_requests.saturating_sub(new_count);

    Ok((true, remaining, ttl.max(0) as u64))
}

/// Per-user rate limit key, scoped per endpoint family.
pub fn rate_limit_key(scope: &str, user_id: Uuid) -> String {
    format!("{}:{}", scope, user_id)
}

pub const RATE_LIMIT_WINDOW_SECONDS: u64 = 60;

/// Self-service issuance is a human pressing a button; a handful per minute
/// is plenty.
pub const GENERATE_LIMIT_PER_MINUTE: u32 = 10;

/// Redemption scans by a checkpoint operator. Also caps how fast anyone can
/// probe the 6-digit code space through this endpoint.
pub const VALIDATE_LIMIT_PER_MINUTE: u32 = 30;
