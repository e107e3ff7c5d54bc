//! Mohali Mart REST API
//!
//! This crate provides the Axum-based HTTP surface for Mohali Mart:
//! account registration and login, profile lookup, contact-form handling,
//! health checks and the embedded site pages, all behind the route
//! gatekeeper from `mohali-auth`.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
