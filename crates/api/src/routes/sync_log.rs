use axum::routing::get;
use axum::Router;

use crate::handlers::sync_log;
use crate::router::{timeout_layer, RouteTimeouts};
use crate::state::AppState;

/// Sync audit log routes mounted at `/sync-log`.
///
/// ```text
/// GET    /                  -> list_entries (?entity_id=&limit=)
/// ```
pub fn router(timeouts: &RouteTimeouts) -> Router<AppState> {
    Router::new()
        .route("/", get(sync_log::list_entries))
        .route_layer(timeout_layer(timeouts.standard))
}
