//! Authentication handlers

pub mod handler;
pub mod request;
pub mod response;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Authentication routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/csrf-token", get(handler::csrf_token))
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
}
