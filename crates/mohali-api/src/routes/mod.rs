//! API routes

mod auth;
mod contact;
mod health;
pub mod metrics;
mod pages;
mod types;
mod users;
mod validation;

use axum::{Router, extract::DefaultBodyLimit, middleware::from_fn_with_state};
use mohali_auth::gatekeeper_middleware;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

pub use auth::{CurrentUser, RequireAdmin, RequireAuth};

/// Maximum accepted request body (form posts only)
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main router
///
/// Every route, the page fallback included, sits behind the gatekeeper.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let gatekeeper = state.gatekeeper.clone();

    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Accounts
        .merge(auth::routes())
        .merge(users::routes())
        // Contact form
        .merge(contact::routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    // Pages must be last so they never shadow API routes
    router
        .fallback(pages::serve_page)
        .layer(from_fn_with_state(gatekeeper, gatekeeper_middleware))
}
