//! Mohali Mart Authentication and Authorization
//!
//! This crate provides signed-token issuance and verification, password
//! hashing, and the route gatekeeper that decides, per request, whether a
//! protected route may be reached.

pub mod error;
pub mod gatekeeper;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use gatekeeper::{Decision, DenyReason, Denial, Gatekeeper, GatekeeperPolicy, RouteClass};
pub use jwt::{Claims, JwtManager};
pub use middleware::{
    AuthUser, USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER, clear_cookie,
    extract_bearer_token, gatekeeper_middleware, session_cookie,
};
pub use password::{hash_password, verify_password};
