//! Sync dispatcher: pushes one post to the main website with bounded retries.
//!
//! One call runs this state machine, sharing a single idempotency key across
//! every attempt:
//!
//! ```text
//! build payload ──(invalid)──> Err(Validation), nothing logged
//!      │
//!   PENDING (attempt 0)
//!      │
//!   ┌─ SENT (attempt n) ── POST {base}/posts
//!   │     ├─ 2xx ──────> CONFIRMED, return result
//!   │     ├─ non-2xx ──> FAILED (status + snippet)
//!   │     └─ no reply ─> FAILED (error message)
//!   └── sleep(delay_after(n)) while n < max_attempts
//!      │
//!   Err(Transport) carrying the last failure
//! ```
//!
//! The receiver deduplicates on `Idempotency-Key`, so a retry of a POST that
//! already succeeded server-side has no second effect.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sitesync_core::error::CoreError;
use sitesync_core::payload::{build_post_payload, PostSyncPayload};
use sitesync_core::post::Post;
use sitesync_core::sync_log::{snippet, NewSyncLogEntry, SyncStatus};
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::log_store::SyncLogSink;
use crate::retry::RetryPolicy;
use crate::transport::{OutboundRequest, ReqwestTransport, SyncTransport};

/// Header carrying the per-call idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Header carrying the site API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Outcome of a confirmed sync.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSyncResult {
    pub idempotency_key: Uuid,
    pub payload: PostSyncPayload,
    /// Parsed response body, `{"raw": text}` when not JSON, null when empty.
    pub response: serde_json::Value,
    pub raw_response: String,
    pub http_status: u16,
}

/// The last thing that went wrong across attempts.
enum AttemptFailure {
    Status { status: u16, snippet: String },
    Network(String),
}

pub struct SyncDispatcher {
    config: SyncConfig,
    transport: Arc<dyn SyncTransport>,
    log: Arc<dyn SyncLogSink>,
    retry: RetryPolicy,
}

impl SyncDispatcher {
    /// Dispatcher using [`RetryPolicy::standard`].
    pub fn new(
        config: SyncConfig,
        transport: Arc<dyn SyncTransport>,
        log: Arc<dyn SyncLogSink>,
    ) -> Self {
        Self {
            config,
            transport,
            log,
            retry: RetryPolicy::standard(),
        }
    }

    /// Dispatcher with a reqwest transport honouring the config's timeout.
    pub fn from_config(config: SyncConfig, log: Arc<dyn SyncLogSink>) -> Result<Self, SyncError> {
        let transport = ReqwestTransport::new(config.request_timeout)
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        Ok(Self::new(config, Arc::new(transport), log))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn log(&self) -> &Arc<dyn SyncLogSink> {
        &self.log
    }

    /// Upper bound on one [`sync_post`](Self::sync_post) call with every
    /// attempt hitting the transport timeout.
    pub fn worst_case_duration(&self) -> Duration {
        self.retry.worst_case(self.config.request_timeout)
    }

    /// Push `post` to the main website.
    ///
    /// Validation failures return before anything is logged. Every attempt is
    /// logged before the result is returned or the final error raised.
    pub async fn sync_post(&self, post: &Post) -> Result<PostSyncResult, SyncError> {
        let payload = build_post_payload(post)?;
        let body = serde_json::to_string(&payload)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize sync payload: {e}")))?;

        let key = Uuid::new_v4();
        let version = payload.version;
        let post_id = post.id.as_str();
        let url = self.config.posts_url();
        let max_attempts = self.retry.max_attempts();

        self.log
            .append(NewSyncLogEntry::post_sync(post_id, 0, SyncStatus::Pending, key, version))
            .await?;
        tracing::info!(post_id, idempotency_key = %key, %url, "Starting post sync");

        let mut last_failure: Option<AttemptFailure> = None;

        for attempt in 1..=max_attempts {
            self.log
                .append(NewSyncLogEntry::post_sync(
                    post_id,
                    attempt,
                    SyncStatus::Sent,
                    key,
                    version,
                ))
                .await?;

            let request = OutboundRequest {
                url: url.clone(),
                headers: vec![
                    ("Content-Type".to_string(), "application/json".to_string()),
                    (IDEMPOTENCY_KEY_HEADER.to_string(), key.to_string()),
                    (API_KEY_HEADER.to_string(), self.config.api_key.clone()),
                ],
                body: body.clone(),
            };

            match self.transport.send(request).await {
                Ok(response) if response.is_success() => {
                    self.log
                        .append(
                            NewSyncLogEntry::post_sync(
                                post_id,
                                attempt,
                                SyncStatus::Confirmed,
                                key,
                                version,
                            )
                            .with_http_code(response.status)
                            .with_snippet(&response.body),
                        )
                        .await?;
                    tracing::info!(
                        post_id,
                        attempt,
                        status = response.status,
                        idempotency_key = %key,
                        "Post sync confirmed"
                    );

                    return Ok(PostSyncResult {
                        idempotency_key: key,
                        payload,
                        response: parse_response_body(&response.body),
                        raw_response: response.body,
                        http_status: response.status,
                    });
                }
                Ok(response) => {
                    self.log
                        .append(
                            NewSyncLogEntry::post_sync(
                                post_id,
                                attempt,
                                SyncStatus::Failed,
                                key,
                                version,
                            )
                            .with_http_code(response.status)
                            .with_snippet(&response.body),
                        )
                        .await?;
                    tracing::warn!(
                        post_id,
                        attempt,
                        status = response.status,
                        "Post sync attempt rejected by site"
                    );
                    last_failure = Some(AttemptFailure::Status {
                        status: response.status,
                        snippet: snippet(&response.body),
                    });
                }
                Err(err) => {
                    self.log
                        .append(
                            NewSyncLogEntry::post_sync(
                                post_id,
                                attempt,
                                SyncStatus::Failed,
                                key,
                                version,
                            )
                            .with_snippet(&err.0),
                        )
                        .await?;
                    tracing::warn!(post_id, attempt, error = %err, "Post sync attempt failed");
                    last_failure = Some(AttemptFailure::Network(err.0));
                }
            }

            if attempt < max_attempts {
                let delay = self.retry.delay_after(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        tracing::error!(post_id, attempts = max_attempts, "Post sync failed after all retries");

        Err(match last_failure {
            Some(AttemptFailure::Status { status, snippet }) => SyncError::Transport {
                status: Some(status),
                message: format!("Site sync failed with HTTP {status}"),
                details: Some(snippet),
            },
            Some(AttemptFailure::Network(message)) => SyncError::Transport {
                status: None,
                message: format!("Site sync failed after retries: {message}"),
                details: Some(message),
            },
            None => SyncError::Transport {
                status: None,
                message: "Site sync failed after retries".into(),
                details: None,
            },
        })
    }
}

/// Parse a response body as JSON, wrapping non-JSON text as `{"raw": text}`.
fn parse_response_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "raw": text }))
}
