//! Two-phase publish: confirm the post on the main website, then mark it
//! published locally.
//!
//! The split makes "live on the site but not yet marked published here" an
//! explicit, recoverable outcome instead of an error. Bulk publishing runs
//! posts one at a time and keeps every success, whatever happens to the
//! rest of the batch.

use std::time::Duration;

use serde::Serialize;
use sitesync_core::error::CoreError;
use sitesync_core::post::{Post, PostStatus};
use sitesync_core::store::{PostStore, StoreError};

use crate::dispatcher::{PostSyncResult, SyncDispatcher};
use crate::error::SyncError;

/// Result of publishing one post.
#[derive(Debug)]
pub enum PublishOutcome {
    /// Synced and marked published locally.
    Published { result: PostSyncResult, post: Post },
    /// Synced, but the local status change failed.
    UploadedStatusUpdateFailed {
        result: PostSyncResult,
        error: StoreError,
    },
    /// Not synced; local state untouched.
    UploadFailed { error: SyncError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcomeKind {
    Published,
    UploadedStatusUpdateFailed,
    UploadFailed,
}

impl PublishOutcome {
    pub fn kind(&self) -> PublishOutcomeKind {
        match self {
            Self::Published { .. } => PublishOutcomeKind::Published,
            Self::UploadedStatusUpdateFailed { .. } => {
                PublishOutcomeKind::UploadedStatusUpdateFailed
            }
            Self::UploadFailed { .. } => PublishOutcomeKind::UploadFailed,
        }
    }

    /// Human-readable failure description, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Published { .. } => None,
            Self::UploadedStatusUpdateFailed { error, .. } => Some(format!(
                "Uploaded to the main website, but updating the local status failed: {error}"
            )),
            Self::UploadFailed { error } => Some(match error.details() {
                Some(details) => format!("{error} ({details})"),
                None => error.to_string(),
            }),
        }
    }
}

/// Publish one post by id.
pub async fn publish_post(
    dispatcher: &SyncDispatcher,
    store: &dyn PostStore,
    post_id: &str,
) -> PublishOutcome {
    let post = match store.get(post_id).await {
        Ok(Some(post)) => post,
        Ok(None) => {
            return PublishOutcome::UploadFailed {
                error: CoreError::NotFound {
                    entity: "Post",
                    id: post_id.to_string(),
                }
                .into(),
            }
        }
        Err(err) => {
            return PublishOutcome::UploadFailed {
                error: CoreError::from(err).into(),
            }
        }
    };

    let result = match dispatcher.sync_post(&post).await {
        Ok(result) => result,
        Err(error) => {
            tracing::warn!(post_id, error = %error, "Upload to main website failed");
            return PublishOutcome::UploadFailed { error };
        }
    };

    match store.set_status(post_id, PostStatus::Published).await {
        Ok(post) => {
            tracing::info!(post_id, idempotency_key = %result.idempotency_key, "Post published");
            PublishOutcome::Published { result, post }
        }
        Err(error) => {
            tracing::error!(
                post_id,
                idempotency_key = %result.idempotency_key,
                error = %error,
                "Post uploaded but local status update failed"
            );
            PublishOutcome::UploadedStatusUpdateFailed { result, error }
        }
    }
}

/// Per-post line of a bulk publish summary.
#[derive(Debug, Clone, Serialize)]
pub struct BulkPublishItem {
    pub post_id: String,
    pub outcome: PublishOutcomeKind,
    pub message: Option<String>,
}

/// Aggregate counts for a bulk publish.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkPublishSummary {
    pub published: usize,
    pub upload_failed: usize,
    pub status_update_failed: usize,
    pub items: Vec<BulkPublishItem>,
}

impl BulkPublishSummary {
    fn record(&mut self, post_id: &str, outcome: &PublishOutcome) {
        match outcome.kind() {
            PublishOutcomeKind::Published => self.published += 1,
            PublishOutcomeKind::UploadFailed => self.upload_failed += 1,
            PublishOutcomeKind::UploadedStatusUpdateFailed => self.status_update_failed += 1,
        }
        self.items.push(BulkPublishItem {
            post_id: post_id.to_string(),
            outcome: outcome.kind(),
            message: outcome.message(),
        });
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}

/// Hard upper bound on posts accepted by one bulk publish.
pub const MAX_BULK_PUBLISH: usize = 100;

/// Largest batch guaranteed to finish within `budget` when every post
/// exhausts its retries, each taking `per_post` at worst.
///
/// Clamped to `1..=MAX_BULK_PUBLISH`.
pub fn bulk_publish_limit(budget: Duration, per_post: Duration) -> usize {
    if per_post.is_zero() {
        return MAX_BULK_PUBLISH;
    }
    let fits = budget.as_millis() / per_post.as_millis().max(1);
    usize::try_from(fits)
        .unwrap_or(MAX_BULK_PUBLISH)
        .clamp(1, MAX_BULK_PUBLISH)
}

/// Publish each post in order, one at a time.
pub async fn publish_many(
    dispatcher: &SyncDispatcher,
    store: &dyn PostStore,
    post_ids: &[String],
) -> BulkPublishSummary {
    let mut summary = BulkPublishSummary::default();
    for post_id in post_ids {
        let outcome = publish_post(dispatcher, store, post_id).await;
        summary.record(post_id, &outcome);
    }

    tracing::info!(
        total = summary.total(),
        published = summary.published,
        upload_failed = summary.upload_failed,
        status_update_failed = summary.status_update_failed,
        "Bulk publish finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use sitesync_core::store::InMemoryPostStore;

    use super::*;
    use crate::config::SyncConfig;
    use crate::log_store::{MemorySyncLog, SyncLogSink};
    use crate::retry::RetryPolicy;
    use crate::testing::StubTransport;

    fn post(id: &str, status: PostStatus) -> Post {
        Post {
            id: id.into(),
            slug: format!("post-{id}"),
            title: format!("Post {id}"),
            body: "<p>Some words.</p>".into(),
            featured_image: None,
            tags: vec!["news".into()],
            categories: vec![],
            seo_title: None,
            meta_description: None,
            status,
            scheduled_at: None,
            published_at: None,
            version: None,
        }
    }

    fn dispatcher(transport: StubTransport) -> SyncDispatcher {
        let config = SyncConfig::new("https://site.example.com", "key").unwrap();
        SyncDispatcher::new(config, Arc::new(transport), Arc::new(MemorySyncLog::new()))
            .with_retry_policy(RetryPolicy::immediate(3))
    }

    /// Store whose status updates always fail.
    struct ReadOnlyStore(InMemoryPostStore);

    #[async_trait]
    impl PostStore for ReadOnlyStore {
        async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
            self.0.get(id).await
        }

        async fn list(&self) -> Result<Vec<Post>, StoreError> {
            self.0.list().await
        }

        async fn upsert(&self, post: Post) -> Result<Post, StoreError> {
            self.0.upsert(post).await
        }

        async fn set_status(&self, _id: &str, _status: PostStatus) -> Result<Post, StoreError> {
            Err(StoreError::Backend("database is read-only".into()))
        }
    }

    #[tokio::test]
    async fn successful_sync_marks_post_published() {
        let store = InMemoryPostStore::with_posts([post("1", PostStatus::Scheduled)]);
        let mut scheduled = store.get("1").await.unwrap().unwrap();
        scheduled.scheduled_at = Some(chrono::Utc::now());
        store.upsert(scheduled).await.unwrap();

        let dispatcher = dispatcher(StubTransport::always(201, "{}"));
        let outcome = publish_post(&dispatcher, &store, "1").await;

        assert_matches!(
            outcome,
            PublishOutcome::Published { ref result, .. } if result.http_status == 201
        );
        let stored = store.get("1").await.unwrap().unwrap();
        assert_eq!(stored.status, PostStatus::Published);
        assert!(stored.published_at.is_some());
    }

    #[test]
    fn bulk_limit_fits_worst_case_posts_into_budget() {
        let per_post = Duration::from_secs(95);
        assert_eq!(bulk_publish_limit(Duration::from_secs(1800), per_post), 18);
        assert_eq!(bulk_publish_limit(Duration::from_secs(95), per_post), 1);
    }

    #[test]
    fn bulk_limit_is_clamped() {
        assert_eq!(
            bulk_publish_limit(Duration::from_secs(10), Duration::from_secs(95)),
            1
        );
        assert_eq!(
            bulk_publish_limit(Duration::from_secs(86_400), Duration::from_secs(1)),
            MAX_BULK_PUBLISH
        );
        assert_eq!(
            bulk_publish_limit(Duration::from_secs(60), Duration::ZERO),
            MAX_BULK_PUBLISH
        );
    }

    #[tokio::test]
    async fn failed_upload_leaves_local_state_unchanged() {
        let store = InMemoryPostStore::with_posts([post("1", PostStatus::Published)]);
        let before = store.get("1").await.unwrap();

        let dispatcher = dispatcher(StubTransport::always(500, "boom"));
        let outcome = publish_post(&dispatcher, &store, "1").await;

        assert_eq!(outcome.kind(), PublishOutcomeKind::UploadFailed);
        assert!(outcome.message().unwrap().contains("boom"));
        assert_eq!(store.get("1").await.unwrap(), before);
    }

    #[tokio::test]
    async fn status_update_failure_is_partial_success() {
        let store = ReadOnlyStore(InMemoryPostStore::with_posts([post(
            "1",
            PostStatus::Published,
        )]));

        let outcome = publish_post(&dispatcher(StubTransport::always(200, "")), &store, "1").await;

        assert_matches!(outcome, PublishOutcome::UploadedStatusUpdateFailed { .. });
    }

    #[tokio::test]
    async fn unknown_post_is_upload_failure_without_network() {
        let transport = StubTransport::always(200, "");
        let dispatcher = dispatcher(transport);
        let store = InMemoryPostStore::new();

        let outcome = publish_post(&dispatcher, &store, "ghost").await;

        assert_matches!(
            outcome,
            PublishOutcome::UploadFailed { error: SyncError::Core(CoreError::NotFound { .. }) }
        );
        assert!(dispatcher.log().entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bulk_publish_aggregates_without_aborting() {
        let store = InMemoryPostStore::with_posts([
            post("a", PostStatus::Published),
            post("b", PostStatus::Draft),
            post("c", PostStatus::Published),
        ]);
        let ids: Vec<String> = ["a", "b", "missing", "c"].iter().map(|s| s.to_string()).collect();

        let summary = publish_many(&dispatcher(StubTransport::always(200, "")), &store, &ids).await;

        assert_eq!(summary.published, 2);
        assert_eq!(summary.upload_failed, 2);
        assert_eq!(summary.status_update_failed, 0);
        assert_eq!(summary.total(), 4);

        let order: Vec<&str> = summary.items.iter().map(|i| i.post_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "missing", "c"]);
        assert_eq!(store.get("b").await.unwrap().unwrap().status, PostStatus::Draft);
        assert_eq!(store.get("c").await.unwrap().unwrap().status, PostStatus::Published);
    }

    #[tokio::test]
    async fn bulk_publish_counts_partial_successes() {
        let store = ReadOnlyStore(InMemoryPostStore::with_posts([
            post("a", PostStatus::Published),
            post("b", PostStatus::Published),
        ]));
        let ids = vec!["a".to_string(), "b".to_string()];

        let summary = publish_many(&dispatcher(StubTransport::always(200, "")), &store, &ids).await;

        assert_eq!(summary.status_update_failed, 2);
        assert_eq!(summary.published, 0);
        assert!(summary.items.iter().all(|i| i.message.is_some()));
    }

    #[tokio::test]
    async fn bulk_posts_are_synced_sequentially_in_request_order() {
        let store = InMemoryPostStore::with_posts([
            post("x", PostStatus::Published),
            post("y", PostStatus::Published),
        ]);
        let log = Arc::new(MemorySyncLog::new());
        let config = SyncConfig::new("https://site.example.com", "key").unwrap();
        let dispatcher = SyncDispatcher::new(
            config,
            Arc::new(StubTransport::always(200, "")),
            log.clone(),
        );

        publish_many(&dispatcher, &store, &["y".to_string(), "x".to_string()]).await;

        let entity_order: Vec<String> = log
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.entity_id)
            .collect();
        assert_eq!(entity_order, ["y", "y", "y", "x", "x", "x"]);
    }
}
