//! Handlers for posts and the "upload to main website" actions.
//!
//! Publishing is two-phase: the post is synced to the main website first,
//! then marked published locally. A failure in the second phase is reported
//! as a partial success (HTTP 207) because the site already has the content.
//!
//! Sync work runs on its own task, so a request that times out or whose
//! client disconnects cannot stop a post between its upload and its status
//! change.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use sitesync_core::post::{Post, PostStatus};
use sitesync_core::store::StoreError;
use sitesync_outbound::publish::{self, BulkPublishSummary, PublishOutcome};
use sitesync_outbound::PostSyncResult;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequirePublisher;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PostStatus,
}

#[derive(Debug, Deserialize)]
pub struct BulkPublishRequest {
    pub post_ids: Vec<String>,
}

/// Body returned by the single-post publish action.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub outcome: publish::PublishOutcomeKind,
    pub partial: bool,
    pub message: Option<String>,
    pub sync: PostSyncResult,
    pub post: Option<Post>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a post, returning 404 if it does not exist.
async fn ensure_post_exists(state: &AppState, id: &str) -> AppResult<Post> {
    state
        .posts
        .get(id)
        .await?
        .ok_or_else(|| AppError::Store(StoreError::NotFound(id.to_string())))
}

/// Run sync work on its own task and wait for it.
async fn run_detached<F>(work: F) -> AppResult<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|err| AppError::InternalError(format!("Sync task failed: {err}")))
}

// ---------------------------------------------------------------------------
// GET /posts
// ---------------------------------------------------------------------------

pub async fn list_posts(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let posts = state.posts.list().await?;
    tracing::debug!(count = posts.len(), "Listed posts");
    Ok(Json(DataResponse { data: posts }))
}

// ---------------------------------------------------------------------------
// GET /posts/{id}
// ---------------------------------------------------------------------------

pub async fn get_post(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post = ensure_post_exists(&state, &id).await?;
    Ok(Json(DataResponse { data: post }))
}

// ---------------------------------------------------------------------------
// PUT /posts/{id}
// ---------------------------------------------------------------------------

/// Insert or replace a post pushed by the CMS.
pub async fn upsert_post(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<Post>,
) -> AppResult<impl IntoResponse> {
    if body.id != id {
        return Err(AppError::BadRequest(format!(
            "Body id '{}' does not match path id '{id}'",
            body.id
        )));
    }
    let saved = state.posts.upsert(body).await?;
    tracing::info!(post_id = %saved.id, status = %saved.status, "Post saved");
    Ok(Json(DataResponse { data: saved }))
}

// ---------------------------------------------------------------------------
// PUT /posts/{id}/status
// ---------------------------------------------------------------------------

pub async fn update_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let post = state.posts.set_status(&id, body.status).await?;
    tracing::info!(post_id = %id, status = %body.status, "Post status updated");
    Ok(Json(DataResponse { data: post }))
}

// ---------------------------------------------------------------------------
// POST /posts/{id}/sync
// ---------------------------------------------------------------------------

/// Upload one post to the main website without touching its local status.
pub async fn sync_post(
    State(state): State<AppState>,
    RequirePublisher(user): RequirePublisher,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let dispatcher = state.dispatcher()?;
    let post = ensure_post_exists(&state, &id).await?;

    let result = run_detached(async move { dispatcher.sync_post(&post).await }).await??;
    tracing::info!(
        post_id = %id,
        user_id = %user.user_id,
        http_status = result.http_status,
        "Post uploaded to main website"
    );
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// POST /posts/{id}/publish
// ---------------------------------------------------------------------------

/// Two-phase publish of one post.
pub async fn publish_post(
    State(state): State<AppState>,
    RequirePublisher(user): RequirePublisher,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let dispatcher = state.dispatcher()?;
    let posts = Arc::clone(&state.posts);
    let post_id = id.clone();
    let outcome = run_detached(async move {
        publish::publish_post(&dispatcher, posts.as_ref(), &post_id).await
    })
    .await?;
    tracing::info!(
        post_id = %id,
        user_id = %user.user_id,
        outcome = ?outcome.kind(),
        "Publish action finished"
    );

    let kind = outcome.kind();
    let message = outcome.message();
    match outcome {
        PublishOutcome::Published { result, post } => Ok((
            StatusCode::OK,
            Json(DataResponse {
                data: PublishResponse {
                    outcome: kind,
                    partial: false,
                    message,
                    sync: result,
                    post: Some(post),
                },
            }),
        )),
        PublishOutcome::UploadedStatusUpdateFailed { result, .. } => Ok((
            StatusCode::MULTI_STATUS,
            Json(DataResponse {
                data: PublishResponse {
                    outcome: kind,
                    partial: true,
                    message,
                    sync: result,
                    post: None,
                },
            }),
        )),
        PublishOutcome::UploadFailed { error } => Err(AppError::Sync(error)),
    }
}

// ---------------------------------------------------------------------------
// POST /posts/bulk-publish
// ---------------------------------------------------------------------------

/// Two-phase publish of many posts, one at a time.
///
/// The number of ids is capped so that every post can exhaust its retries
/// within `bulk_publish_timeout_secs`.
pub async fn bulk_publish(
    State(state): State<AppState>,
    RequirePublisher(user): RequirePublisher,
    Json(body): Json<BulkPublishRequest>,
) -> AppResult<impl IntoResponse> {
    if body.post_ids.is_empty() {
        return Err(AppError::BadRequest("post_ids must not be empty".into()));
    }

    let dispatcher = state.dispatcher()?;
    let limit = publish::bulk_publish_limit(
        Duration::from_secs(state.config.bulk_publish_timeout_secs),
        dispatcher.worst_case_duration(),
    );
    if body.post_ids.len() > limit {
        return Err(AppError::BadRequest(format!(
            "At most {limit} posts can be published per request"
        )));
    }

    let posts = Arc::clone(&state.posts);
    let post_ids = body.post_ids;
    let summary: BulkPublishSummary = run_detached(async move {
        publish::publish_many(&dispatcher, posts.as_ref(), &post_ids).await
    })
    .await?;
    tracing::info!(
        user_id = %user.user_id,
        published = summary.published,
        upload_failed = summary.upload_failed,
        status_update_failed = summary.status_update_failed,
        "Bulk publish action finished"
    );
    Ok(Json(DataResponse { data: summary }))
}
