use std::sync::Arc;

use sitesync_core::error::CoreError;
use sitesync_core::store::PostStore;
use sitesync_outbound::{SyncDispatcher, SyncLogSink};

use crate::config::ServerConfig;
use crate::error::AppError;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Post repository (Postgres, or the in-memory fallback).
    pub posts: Arc<dyn PostStore>,
    /// Sync audit log, shared with the dispatcher.
    pub sync_log: Arc<dyn SyncLogSink>,
    /// `None` when `ADMIN_SITE_SYNC_URL` / `ADMIN_SITE_API_KEY` are missing.
    pub dispatcher: Option<Arc<SyncDispatcher>>,
    /// Present when running against Postgres; used by the health check.
    pub db_pool: Option<sitesync_db::DbPool>,
}

impl AppState {
    /// The dispatcher, or a configuration error raised before any sync work.
    pub fn dispatcher(&self) -> Result<Arc<SyncDispatcher>, AppError> {
        self.dispatcher.clone().ok_or_else(|| {
            AppError::Core(CoreError::Configuration(
                "Main website sync is not configured \
                 (ADMIN_SITE_SYNC_URL and ADMIN_SITE_API_KEY are required)"
                    .into(),
            ))
        })
    }
}
