use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::router::{timeout_layer, RouteTimeouts};
use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable. `None` when running on the
    /// in-memory store.
    pub db_healthy: Option<bool>,
    /// Whether the main website sync endpoint is configured.
    pub sync_configured: bool,
}

/// GET /health -- returns service, database and sync configuration health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match &state.db_pool {
        Some(pool) => Some(sitesync_db::health_check(pool).await.is_ok()),
        None => None,
    };
    let sync_configured = state.dispatcher.is_some();

    let status = if db_healthy != Some(false) && sync_configured {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        sync_configured,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router(timeouts: &RouteTimeouts) -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route_layer(timeout_layer(timeouts.standard))
}
