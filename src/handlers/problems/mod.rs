//! Problem handlers

pub mod handler;
pub mod request;
pub mod response;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Problem routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/problems", get(handler::list_problems))
        .route("/api/problem/{slug}", get(handler::get_problem))
}
