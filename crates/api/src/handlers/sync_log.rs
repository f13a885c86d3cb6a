//! Read access to the sync audit log.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sitesync_outbound::SyncError;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct SyncLogParams {
    pub entity_id: Option<String>,
    pub limit: Option<usize>,
}

/// GET /sync-log -- most recent entries, oldest first, optionally for one post.
pub async fn list_entries(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<SyncLogParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let mut entries = state.sync_log.entries().await.map_err(SyncError::from)?;
    if let Some(entity_id) = params.entity_id.as_deref() {
        entries.retain(|e| e.entity_id == entity_id);
    }
    let skip = entries.len().saturating_sub(limit);
    let recent = entries.split_off(skip);

    Ok(Json(DataResponse { data: recent }))
}
