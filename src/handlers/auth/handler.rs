//! Authentication handler implementations

use axum::{extract::State, http::StatusCode, Json};
use rand::Rng;
use validator::Validate;

use crate::{
    error::AppResult,
    models::UserInfo,
    services::AuthService,
    state::AppState,
};

use super::{
    request::{LoginRequest, RegisterRequest},
    response::{AuthResponse, CsrfTokenResponse},
};

/// Issue a CSRF token for browser clients
pub async fn csrf_token() -> Json<CsrfTokenResponse> {
    let bytes: [u8; 32] = rand::rng().random();
    Json(CsrfTokenResponse {
        csrf_token: hex::encode(bytes),
    })
}

/// Create a user account and log it in
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload.validate()?;

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    let (user_id, token) = AuthService::register(
        state.db(),
        state.config(),
        &username,
        &email,
        &payload.password,
    )
    .await?;

    tracing::info!(user_id, %username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user: UserInfo {
                id: user_id,
                username,
                email,
            },
        }),
    ))
}

/// Issue a JWT for valid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.validate()?;

    let (user, token) = AuthService::login(
        state.db(),
        state.config(),
        payload.username.trim(),
        &payload.password,
    )
    .await?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserInfo::from(&user),
    }))
}
