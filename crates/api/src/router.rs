//! Shared application router builder.
//!
//! Provides [`build_app_router`] so both the production binary (`main.rs`)
//! and integration tests (`tests/common/mod.rs`) use the same middleware
//! stack.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use sitesync_outbound::SyncDispatcher;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Headroom on top of the computed worst case for store reads and writes.
const SYNC_SLACK: Duration = Duration::from_secs(10);

/// Request time budgets per route group.
///
/// Sync routes can wait out a whole retry schedule, so they get budgets
/// derived from the dispatcher's worst case instead of the plain
/// `request_timeout_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTimeouts {
    /// Reads, upserts and local status changes.
    pub standard: Duration,
    /// Single-post sync and publish.
    pub sync: Duration,
    /// Bulk publish.
    pub bulk: Duration,
}

impl RouteTimeouts {
    pub fn new(config: &ServerConfig, dispatcher: Option<&SyncDispatcher>) -> Self {
        let standard = Duration::from_secs(config.request_timeout_secs);
        let per_post = dispatcher
            .map(SyncDispatcher::worst_case_duration)
            .unwrap_or(Duration::ZERO);
        // The bulk limit fits the batch into the budget, but a single post
        // may still outlast a budget smaller than its own worst case.
        let bulk_budget =
            Duration::from_secs(config.bulk_publish_timeout_secs).max(per_post);

        Self {
            standard,
            sync: standard.max(per_post.saturating_add(SYNC_SLACK)),
            bulk: standard.max(bulk_budget.saturating_add(SYNC_SLACK)),
        }
    }
}

/// Timeout middleware answering `408 Request Timeout` after `budget`.
pub fn timeout_layer(budget: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, budget)
}

/// Build the full application [`Router`] with all middleware layers.
///
/// The middleware stack is applied bottom-up:
///
/// 1. CORS
/// 2. Set request ID on incoming requests
/// 3. Structured request/response tracing
/// 4. Propagate request ID to response
/// 5. Panic recovery (catch panics, return 500)
/// 6. Request timeout, per route group (see [`RouteTimeouts`])
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);
    let request_id_header = HeaderName::from_static("x-request-id");
    let timeouts = RouteTimeouts::new(config, state.dispatcher.as_deref());
    tracing::debug!(?timeouts, "Route timeouts");

    Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router(&timeouts))
        .nest("/api/v1", routes::api_routes(&timeouts))
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
