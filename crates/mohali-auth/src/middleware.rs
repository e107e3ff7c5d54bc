//! Authentication middleware for Axum

use axum::{
    Json,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, LOCATION, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use mohali_db::UserRole;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::gatekeeper::{Decision, Denial, DenyReason, Gatekeeper, GatekeeperPolicy, RouteClass};
use crate::jwt::Claims;

/// Request header carrying the verified subject id
pub const USER_ID_HEADER: &str = "x-user-id";
/// Request header carrying the verified contact email
pub const USER_EMAIL_HEADER: &str = "x-user-email";
/// Request header carrying the verified role
pub const USER_ROLE_HEADER: &str = "x-user-role";

const ANNOTATION_HEADERS: [&str; 3] = [USER_ID_HEADER, USER_EMAIL_HEADER, USER_ROLE_HEADER];

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }

    /// Read the identity the gatekeeper attached to a forwarded request
    pub fn from_annotations(headers: &HeaderMap) -> Option<Self> {
        let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        Some(Self {
            id: get(USER_ID_HEADER)?.to_string(),
            email: get(USER_EMAIL_HEADER)?.to_string(),
            role: get(USER_ROLE_HEADER)?.parse().ok()?,
        })
    }

    /// Attach this identity to outgoing request headers
    fn annotate(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        let id = HeaderValue::from_str(&self.id)?;
        let email = HeaderValue::from_str(&self.email)?;
        headers.insert(USER_ID_HEADER, id);
        headers.insert(USER_EMAIL_HEADER, email);
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static(self.role.as_str()));
        Ok(())
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Gatekeeper middleware
///
/// Runs ahead of every handler. Identity annotations sent by the client are
/// always discarded; they are set again only when a credential verifies.
/// Denied API requests get a 401 JSON body, denied page requests a redirect
/// to the login surface.
pub async fn gatekeeper_middleware(
    State(gatekeeper): State<Arc<Gatekeeper>>,
    mut request: Request,
    next: Next,
) -> Response {
    strip_annotations(request.headers_mut());

    let decision = gatekeeper.evaluate(request.uri().path(), request.headers());
    metrics::counter!("mohali_gatekeeper_decisions_total", "outcome" => decision.outcome())
        .increment(1);

    match decision {
        Decision::Open => next.run(request).await,
        Decision::Authorized { class, user } => {
            if let Err(e) = user.annotate(request.headers_mut()) {
                warn!("Claims for {} cannot be forwarded as headers: {}", user.id, e);
                strip_annotations(request.headers_mut());
                let denial = Denial {
                    class,
                    reason: DenyReason::InvalidOrExpired,
                    path: request.uri().path().to_string(),
                };
                return denial_response(&denial, gatekeeper.policy());
            }

            debug!("Forwarding {} as {} ({})", request.uri().path(), user.id, user.role);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Decision::Denied(denial) => denial_response(&denial, gatekeeper.policy()),
    }
}

fn strip_annotations(headers: &mut HeaderMap) {
    for name in ANNOTATION_HEADERS {
        headers.remove(name);
    }
}

/// Render a denial according to the class of the refused route
pub fn denial_response(denial: &Denial, policy: &GatekeeperPolicy) -> Response {
    match denial.class {
        RouteClass::ProtectedPage => {
            let location = policy.login_redirect(&denial.path);
            let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();
            let headers = response.headers_mut();

            if let Ok(value) = HeaderValue::from_str(&location) {
                headers.insert(LOCATION, value);
            }
            // Only a presented-but-bad credential leaves something stale behind
            if denial.reason == DenyReason::InvalidOrExpired
                && let Ok(value) = HeaderValue::from_str(&clear_cookie(&policy.cookie_name))
            {
                headers.append(SET_COOKIE, value);
            }
            response
        }
        // Open requests never reach here; treat them like API routes regardless
        RouteClass::ProtectedApi | RouteClass::Open => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "error": denial.reason.api_message()
            })),
        )
            .into_response(),
    }
}

/// `Set-Cookie` value that expires the named cookie immediately
pub fn clear_cookie(name: &str) -> String {
    format!(
        "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax",
        name
    )
}

/// `Set-Cookie` value carrying a freshly issued token
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name, token, max_age_secs
    )
}
