pub mod health;
pub mod posts;
pub mod sync_log;

use axum::Router;

use crate::router::RouteTimeouts;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /posts                        list
/// /posts/bulk-publish           publish many posts (POST)
/// /posts/{id}                   get, upsert
/// /posts/{id}/status            local status change (PUT)
/// /posts/{id}/sync              upload to main website (POST)
/// /posts/{id}/publish           upload then mark published (POST)
///
/// /sync-log                     sync audit entries
/// ```
pub fn api_routes(timeouts: &RouteTimeouts) -> Router<AppState> {
    Router::new()
        .nest("/posts", posts::router(timeouts))
        .nest("/sync-log", sync_log::router(timeouts))
}
