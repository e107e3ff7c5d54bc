//! Health check endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use crate::state::AppState;

use super::types::{DatabaseCheckResponse, HealthResponse};

/// Health check handler
async fn health() -> Json<HealthResponse> {
    metrics::counter!("mohali_health_checks_total").increment(1);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/test-db
async fn test_db(State(state): State<AppState>) -> Response {
    match state.db.ping().await {
        Ok(()) => Json(DatabaseCheckResponse {
            success: true,
            message: "Database connected successfully".to_string(),
            timestamp: Utc::now(),
        })
        .into_response(),
        Err(e) => {
            error!("Database check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": e.to_string(),
                    "message": "Database connection failed"
                })),
            )
                .into_response()
        }
    }
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/test-db", get(test_db))
}
