//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header::{AUTHORIZATION, SET_COOKIE}, request::Parts},
    routing::post,
};
use mohali_auth::{
    AuthError, AuthUser, clear_cookie, extract_bearer_token, hash_password, session_cookie,
    verify_password,
};
use mohali_db::{DbError, NewUser, UserRole};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, UserSummary,
};
use super::validation::{MAX_PASSWORD_LENGTH, is_valid_account_email, present, validate_password};

// ==================== Auth Extractors ====================

/// Extractor for authenticated user (required)
///
/// Uses the identity the gatekeeper attached to the request when present,
/// otherwise verifies a bearer token itself.
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(RequireAuth(user.clone()));
        }

        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| extract_bearer_token(h).ok())
            .ok_or(AuthError::MissingAuthHeader)?;

        let claims = app_state.jwt.validate_token(token)?;
        let user = AuthUser::from_claims(&claims);

        debug!("Authenticated user: {} ({})", user.email, user.role);
        Ok(RequireAuth(user))
    }
}

/// Extractor for admin user (required)
pub struct RequireAdmin(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(AuthError::InsufficientPermissions.into());
        }

        Ok(RequireAdmin(user))
    }
}

/// Identity attached by the gatekeeper, if any
///
/// The gatekeeper strips client-supplied identity headers, so the
/// annotations are trusted when the extension is missing.
pub struct CurrentUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .or_else(|| AuthUser::from_annotations(&parts.headers));
        Ok(CurrentUser(user))
    }
}

// ==================== Auth Routes ====================

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = payload?;

    let (Some(name), Some(email)) = (present(&request.name), present(&request.email)) else {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".to_string(),
        ));
    };
    let password = request.password.as_deref().unwrap_or_default();

    if !is_valid_account_email(email) {
        return Err(ApiError::BadRequest(
            "Invalid email format".to_string(),
        ));
    }
    validate_password(password)?;

    debug!("Registering account: {}", email);

    let password_hash = hash_password(password)?;

    let user = state
        .db
        .insert_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role: UserRole::Customer,
            phone: request.phone.clone(),
        })
        .await
        .map_err(|e| match e {
            DbError::Duplicate(_) => ApiError::Conflict("User with this email already exists".to_string()),
            e => e.into(),
        })?;

    metrics::counter!("mohali_registrations_total").increment(1);
    info!("Registered account {} ({})", user.email, user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully".to_string(),
            user: UserSummary::from(&user),
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let Json(request) = payload?;

    let (Some(email), Some(password)) = (
        present(&request.email),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };
    if password.len() > MAX_PASSWORD_LENGTH {
        record_login("rejected");
        return Err(AuthError::InvalidCredentials.into());
    }

    debug!("Login attempt for: {}", email);

    let user = state.db.get_user_by_email(email).await?;

    // Run a verification either way so unknown accounts cost the same
    let password_valid = match &user {
        Some(u) => verify_password(password, &u.password_hash)?,
        None => {
            let _ = hash_password(password);
            false
        }
    };

    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => {
            record_login("rejected");
            warn!("Rejected login for {}", email);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.jwt.generate_token(&user.id, &user.email, user.role)?;
    let expires_in = state.jwt.token_ttl_secs();

    let mut headers = HeaderMap::new();
    let cookie_name = &state.gatekeeper.policy().cookie_name;
    if let Ok(value) = HeaderValue::from_str(&session_cookie(cookie_name, &token, expires_in)) {
        headers.insert(SET_COOKIE, value);
    }

    record_login("success");
    info!("User {} logged in", user.email);

    Ok((
        headers,
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            token,
            expires_in,
            user: UserSummary::from(&user),
        }),
    ))
}

/// POST /api/auth/logout
async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<MessageResponse>) {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&clear_cookie(&state.gatekeeper.policy().cookie_name)) {
        headers.insert(SET_COOKIE, value);
    }

    (
        headers,
        Json(MessageResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
}

fn record_login(result: &'static str) {
    metrics::counter!("mohali_logins_total", "result" => result).increment(1);
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}
