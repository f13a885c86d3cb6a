//! Route definitions for posts and main website publishing.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::posts;
use crate::router::{timeout_layer, RouteTimeouts};
use crate::state::AppState;

/// Post routes mounted at `/posts`.
///
/// ```text
/// GET    /                  -> list_posts
/// POST   /bulk-publish      -> bulk_publish (admin/editor)
/// GET    /{id}              -> get_post
/// PUT    /{id}              -> upsert_post
/// PUT    /{id}/status       -> update_status
/// POST   /{id}/sync         -> sync_post (admin/editor)
/// POST   /{id}/publish      -> publish_post (admin/editor)
/// ```
///
/// Sync and publish routes run under the sync budget, bulk publish under
/// the bulk budget, everything else under the standard timeout.
pub fn router(timeouts: &RouteTimeouts) -> Router<AppState> {
    let local = Router::new()
        .route("/", get(posts::list_posts))
        .route("/{id}", get(posts::get_post).put(posts::upsert_post))
        .route("/{id}/status", put(posts::update_status))
        .route_layer(timeout_layer(timeouts.standard));

    let sync = Router::new()
        .route("/{id}/sync", post(posts::sync_post))
        .route("/{id}/publish", post(posts::publish_post))
        .route_layer(timeout_layer(timeouts.sync));

    let bulk = Router::new()
        .route("/bulk-publish", post(posts::bulk_publish))
        .route_layer(timeout_layer(timeouts.bulk));

    local.merge(sync).merge(bulk)
}
