//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),

    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Token lifetime is out of range")]
    InvalidTokenLifetime,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::Jwt(_) => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token")
            }
            AuthError::MissingAuthHeader => (StatusCode::UNAUTHORIZED, "No token provided"),
            AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid authorization header format",
            ),
            AuthError::InsufficientPermissions => {
                (StatusCode::FORBIDDEN, "Insufficient permissions")
            }
            AuthError::InvalidClaims(_) => (StatusCode::BAD_REQUEST, "Invalid token claims"),
            AuthError::MissingSecret
            | AuthError::InvalidTokenLifetime
            | AuthError::PasswordHash(_) => {
                tracing::error!("Authentication failure: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        };

        let body = axum::Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
