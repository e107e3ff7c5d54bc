//! Route gatekeeper
//!
//! Every inbound request passes through [`Gatekeeper::evaluate`] before it
//! reaches a handler. The path is classified against two prefix lists, and
//! for protected classes a credential is pulled from the request and
//! verified. The outcome is a [`Decision`]; turning a decision into an HTTP
//! response is the job of [`crate::middleware::gatekeeper_middleware`].
//!
//! ```text
//! path ──classify──► Open ───────────────────────────────► Decision::Open
//!                 └► ProtectedApi / ProtectedPage
//!                        └─extract──► none ─────────────► Denied(NoCredential)
//!                                  └► token ─verify─► ok ► Authorized(user)
//!                                                  └► err ► Denied(InvalidOrExpired)
//! ```

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::jwt::JwtManager;
use crate::middleware::{AuthUser, extract_bearer_token};

/// Cookie that carries the credential when no bearer header is sent
pub const DEFAULT_COOKIE_NAME: &str = "token";
/// Login surface that protected pages redirect to
pub const DEFAULT_LOGIN_PATH: &str = "/auth";
/// Query parameter carrying the originally requested path
pub const REDIRECT_PARAM: &str = "redirect";

/// Access-control policy: which paths are protected, and how
///
/// Prefixes are matched as plain string prefixes, so `/api/contact` also
/// covers `/api/contact/123`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatekeeperPolicy {
    pub protected_api_prefixes: Vec<String>,
    pub protected_page_prefixes: Vec<String>,
    pub cookie_name: String,
    pub login_path: String,
}

impl Default for GatekeeperPolicy {
    fn default() -> Self {
        Self {
            protected_api_prefixes: vec!["/api/contact".to_string()],
            protected_page_prefixes: vec!["/tattoo/booking".to_string(), "/art/booking".to_string()],
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl GatekeeperPolicy {
    /// Location of the login surface for a denied page request
    pub fn login_redirect(&self, original_path: &str) -> String {
        login_redirect_location(&self.login_path, original_path)
    }

    /// Classify a request path
    ///
    /// Both lists are checked independently. A path that matches both is
    /// treated as an API route.
    pub fn classify(&self, path: &str) -> RouteClass {
        let is_api = self
            .protected_api_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()));
        let is_page = self
            .protected_page_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()));

        match (is_api, is_page) {
            (true, _) => RouteClass::ProtectedApi,
            (false, true) => RouteClass::ProtectedPage,
            (false, false) => RouteClass::Open,
        }
    }
}

/// Protection class of a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Open,
    ProtectedApi,
    ProtectedPage,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Open => "open",
            RouteClass::ProtectedApi => "protected-api",
            RouteClass::ProtectedPage => "protected-page",
        }
    }
}

/// Why a protected request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Neither the header nor the cookie carried a credential
    NoCredential,
    /// A credential was presented but failed verification
    InvalidOrExpired,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoCredential => "no-credential",
            DenyReason::InvalidOrExpired => "invalid-or-expired",
        }
    }

    /// Human-readable message returned to API clients
    pub fn api_message(&self) -> &'static str {
        match self {
            DenyReason::NoCredential => "Authentication required. Please log in.",
            DenyReason::InvalidOrExpired => "Session expired. Please log in again.",
        }
    }
}

/// A refused request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub class: RouteClass,
    pub reason: DenyReason,
    /// Path the client asked for, used as the post-login return target
    pub path: String,
}

/// Outcome of running a request through the gatekeeper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Unprotected path; no credential was looked at
    Open,
    /// Protected path with a verified credential
    Authorized { class: RouteClass, user: AuthUser },
    /// Protected path that must not reach its handler
    Denied(Denial),
}

impl Decision {
    /// Short label used for logging and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Open => "open",
            Decision::Authorized { .. } => "authorized",
            Decision::Denied(denial) => denial.reason.as_str(),
        }
    }
}

/// Request gatekeeper
///
/// Holds only immutable policy and the shared verifier, so a single
/// instance is shared by all requests.
#[derive(Clone)]
pub struct Gatekeeper {
    policy: Arc<GatekeeperPolicy>,
    jwt: Arc<JwtManager>,
}

impl Gatekeeper {
    /// Create a gatekeeper enforcing `policy` with tokens checked by `jwt`
    pub fn new(policy: GatekeeperPolicy, jwt: Arc<JwtManager>) -> Self {
        Self {
            policy: Arc::new(policy),
            jwt,
        }
    }

    /// The policy this gatekeeper enforces
    pub fn policy(&self) -> &GatekeeperPolicy {
        &self.policy
    }

    /// Decide whether a request for `path` carrying `headers` may proceed
    pub fn evaluate(&self, path: &str, headers: &HeaderMap) -> Decision {
        let class = self.policy.classify(path);
        if class == RouteClass::Open {
            return Decision::Open;
        }

        let deny = |reason| {
            Decision::Denied(Denial {
                class,
                reason,
                path: path.to_string(),
            })
        };

        let Some(token) = self.extract_credential(headers) else {
            debug!("No credential for {} route {}", class.as_str(), path);
            return deny(DenyReason::NoCredential);
        };

        match self.jwt.validate_token(token) {
            Ok(claims) => {
                let user = AuthUser::from_claims(&claims);
                debug!(
                    "Authorized {} for {} route {}",
                    user.email,
                    class.as_str(),
                    path
                );
                Decision::Authorized { class, user }
            }
            Err(e) => {
                warn!("Rejected credential for {}: {}", path, e);
                deny(DenyReason::InvalidOrExpired)
            }
        }
    }

    /// Pull a candidate credential from the request
    ///
    /// A `Bearer` authorization header wins; otherwise the policy's cookie
    /// is consulted. Empty values count as absent.
    pub fn extract_credential<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        let from_header = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| extract_bearer_token(h).ok())
            .filter(|token| !token.is_empty());

        from_header.or_else(|| cookie_value(headers, &self.policy.cookie_name))
    }
}

/// Find a non-empty cookie by name across all `Cookie` headers
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Build `<login_path>?redirect=<original_path>`
///
/// Each path segment is form-encoded on its own so the `/` separators stay
/// readable, e.g. `/auth?redirect=/tattoo/booking`.
pub fn login_redirect_location(login_path: &str, original_path: &str) -> String {
    let target = original_path
        .split('/')
        .map(|segment| url::form_urlencoded::byte_serialize(segment.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join("/");

    format!("{}?{}={}", login_path, REDIRECT_PARAM, target)
}
