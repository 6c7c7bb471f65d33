//! Authentication response types

use serde::Serialize;

use crate::models::UserInfo;

/// Issued on successful register/login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

/// CSRF token payload
#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}
