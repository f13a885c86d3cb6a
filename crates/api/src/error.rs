use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sitesync_core::error::CoreError;
use sitesync_core::store::StoreError;
use sitesync_outbound::{SyncError, SyncErrorKind};

/// Application-level error type for HTTP handlers.
///
/// Wraps domain and sync errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sitesync_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed sync call.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A post repository failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// HTTP status reported for a failed sync call.
///
/// Transport failures mirror the remote status; failures that never got a
/// response report 502.
pub fn sync_error_status(err: &SyncError) -> StatusCode {
    match err.kind() {
        SyncErrorKind::Validation => StatusCode::BAD_REQUEST,
        SyncErrorKind::NotFound => StatusCode::NOT_FOUND,
        SyncErrorKind::Transport => err
            .remote_status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        SyncErrorKind::Configuration | SyncErrorKind::Log | SyncErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn internal(msg: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Configuration(msg) => {
            tracing::error!(error = %msg, "Configuration error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                msg.clone(),
            )
        }
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => internal(msg),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details: Option<String> = None;

        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core(core),

            AppError::Sync(SyncError::Core(core)) => classify_core(core),
            AppError::Sync(err @ SyncError::Transport { message, .. }) => {
                details = err.details().map(str::to_string);
                (sync_error_status(err), "SYNC_FAILED", message.clone())
            }
            AppError::Sync(SyncError::Log(err)) => internal(err),

            AppError::Store(StoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Post with id {id} not found"),
            ),
            AppError::Store(StoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Store(err @ StoreError::Backend(_)) => internal(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, axum::Json(body)).into_response()
    }
}
