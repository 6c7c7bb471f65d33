//! Run and submission handlers

pub mod handler;
pub mod request;
pub mod response;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Execution and submission routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/run", post(handler::run_code))
        .route("/api/submit", post(handler::submit))
        .route("/api/submissions", get(handler::list_submissions))
        .route("/api/submission/{id}", get(handler::get_submission))
}
