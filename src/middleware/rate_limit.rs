//! Rate limiting middleware
//!
//! Fixed-window counters in Redis, keyed by the authenticated user when
//! there is one and the remote address otherwise. The tight quotas on
//! /run and /submit keep the container executor from saturating.

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::AsyncCommands;
use std::net::SocketAddr;

use crate::{constants::rate_limits, middleware::auth::AuthenticatedUser, state::AppState};

/// Rate limit middleware
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let path = request.uri().path().to_string();
    let (limit, window) = quota_for_path(&path);

    // Submission quotas follow the user across addresses once logged in.
    let principal = match request.extensions().get::<AuthenticatedUser>() {
        Some(user) => format!("user_{}", user.id),
        None => addr.ip().to_string(),
    };

    let key = format!("rate_limit:{}:{}", principal, path_bucket(&path));
    let mut redis = state.redis();

    // Counter errors fail open: losing rate limiting beats dropping traffic.
    let count: i64 = redis.incr(&key, 1).await.unwrap_or(0);

    if count == 1 {
        let _: () = redis.expire(&key, window).await.unwrap_or(());
    }

    if count > limit {
        tracing::warn!(%principal, %path, count, limit, "rate limit exceeded");
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            format!("Rate limit exceeded. Try again in {window} seconds."),
        ));
    }

    Ok(next.run(request).await)
}

/// Quota for a path: (max requests, window seconds)
fn quota_for_path(path: &str) -> (i64, i64) {
    let limit = match path {
        "/api/auth/register" => rate_limits::REGISTER_MAX_REQUESTS,
        "/api/auth/login" => rate_limits::LOGIN_MAX_REQUESTS,
        "/api/run" => rate_limits::RUN_MAX_REQUESTS,
        "/api/submit" => rate_limits::SUBMIT_MAX_REQUESTS,
        _ => rate_limits::GENERAL_MAX_REQUESTS,
    };
    (limit, rate_limits::WINDOW_SECS)
}

/// Counter bucket for a path (endpoints with their own quota get their
/// own bucket; reads share one)
fn path_bucket(path: &str) -> &str {
    match path {
        "/api/auth/register" => "register",
        "/api/auth/login" => "login",
        "/api/run" => "run",
        "/api/submit" => "submit",
        _ => "general",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_per_endpoint() {
        assert_eq!(quota_for_path("/api/auth/register").0, 10);
        assert_eq!(quota_for_path("/api/auth/login").0, 20);
        assert_eq!(quota_for_path("/api/run").0, 50);
        assert_eq!(quota_for_path("/api/submit").0, 30);
        assert_eq!(quota_for_path("/api/problems").0, 100);
        assert_eq!(quota_for_path("/api/run").1, 3600);
    }

    #[test]
    fn test_buckets_are_distinct_for_quota_endpoints() {
        assert_eq!(path_bucket("/api/run"), "run");
        assert_eq!(path_bucket("/api/submit"), "submit");
        assert_eq!(path_bucket("/api/problems"), "general");
        assert_eq!(path_bucket("/api/submissions"), "general");
    }
}
