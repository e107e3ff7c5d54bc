//! Application state

use mohali_auth::{Gatekeeper, JwtManager};
use mohali_db::Database;
use std::sync::Arc;

/// Handle used to render Prometheus metrics
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub gatekeeper: Arc<Gatekeeper>,
}

impl AppState {
    pub fn new(db: Database, jwt: Arc<JwtManager>, gatekeeper: Arc<Gatekeeper>) -> Self {
        Self { db, jwt, gatekeeper }
    }
}
