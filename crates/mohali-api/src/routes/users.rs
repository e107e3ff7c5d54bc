//! Account profile routes

use axum::{Json, Router, extract::State, routing::get};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAuth;
use super::types::{ProfileResponse, ProfileUser};

/// GET /api/user/profile
async fn profile(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_id(&auth.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: ProfileUser::from(user),
    }))
}

/// Create profile routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/user/profile", get(profile))
}
