//! Authentication middleware

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::AppError, services::AuthService, state::AppState};

/// Authenticated user extracted from a verified JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user wrapper (never fails)
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(
            parts.extensions.get::<AuthenticatedUser>().cloned(),
        ))
    }
}

/// Optional authentication middleware.
///
/// Verifies a bearer token when one is present and stashes the user in
/// request extensions; endpoints that require auth use the
/// `AuthenticatedUser` extractor, which rejects when the extension is
/// absent. A bad token on an optional endpoint is simply anonymous.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            match AuthService::verify_token(token, &state.config().auth.jwt_secret) {
                Ok(claims) => {
                    let user = AuthenticatedUser {
                        id: claims.user_id,
                        username: claims.username,
                    };
                    debug!(path = %request.uri().path(), user_id = user.id, "request authenticated");
                    request.extensions_mut().insert(user);
                }
                Err(e) => {
                    debug!(path = %request.uri().path(), error = ?e, "bearer token rejected");
                }
            }
        }
    }

    next.run(request).await
}
