//! Health check handlers

use axum::{http::StatusCode, routing::get, extract::State, Json, Router};
use serde::Serialize;

use crate::{db, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Health check endpoint: reports database reachability
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match db::test_connection(state.db()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                detail: None,
            }),
        ),
        Err(e) => {
            tracing::error!("health check database error: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "error".to_string(),
                    detail: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
