//! Post repository seam used by the publish orchestration.
//!
//! The sync core depends only on the [`Post`] shape. Storage is injected
//! through [`PostStore`]: Postgres in production, [`InMemoryPostStore`] as
//! the offline fallback and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::post::{Post, PostStatus};
use crate::types::{PostId, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    NotFound(PostId),

    /// A uniqueness rule (e.g. the slug) rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("Post store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn slug_taken(slug: &str) -> Self {
        Self::Conflict(format!("Slug '{slug}' is already used by another post"))
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => CoreError::NotFound { entity: "Post", id },
            StoreError::Conflict(msg) => CoreError::Conflict(msg),
            StoreError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError>;

    async fn list(&self) -> Result<Vec<Post>, StoreError>;

    /// Insert or replace a post by id.
    async fn upsert(&self, post: Post) -> Result<Post, StoreError>;

    /// Change the local status. Publishing stamps `published_at` when unset.
    async fn set_status(&self, id: &str, status: PostStatus) -> Result<Post, StoreError>;
}

/// Apply a status change to an in-memory post.
pub fn apply_status(post: &mut Post, status: PostStatus, now: Timestamp) {
    post.status = status;
    if status == PostStatus::Published && post.published_at.is_none() {
        post.published_at = Some(now);
    }
}

/// Process-local post store keyed by post id.
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<PostId, Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an initial set of posts.
    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let map = posts.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            posts: RwLock::new(map),
        }
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(posts)
    }

    /// Non-empty slugs are unique across posts.
    async fn upsert(&self, post: Post) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        let taken = !post.slug.is_empty()
            && posts
                .values()
                .any(|other| other.id != post.id && other.slug == post.slug);
        if taken {
            return Err(StoreError::slug_taken(&post.slug));
        }
        posts.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn set_status(&self, id: &str, status: PostStatus) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        apply_status(post, status, chrono::Utc::now());
        Ok(post.clone())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn post(id: &str, status: PostStatus) -> Post {
        Post {
            id: id.into(),
            slug: format!("post-{id}"),
            title: "Title".into(),
            body: "<p>Body</p>".into(),
            featured_image: None,
            tags: vec!["t".into()],
            categories: vec![],
            seo_title: None,
            meta_description: None,
            status,
            scheduled_at: None,
            published_at: None,
            version: None,
        }
    }

    #[tokio::test]
    async fn upsert_then_get() {
        let store = InMemoryPostStore::new();
        store.upsert(post("a", PostStatus::Draft)).await.unwrap();
        let found = store.get("a").await.unwrap().unwrap();
        assert_eq!(found.status, PostStatus::Draft);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_rejects_slug_of_another_post() {
        let store = InMemoryPostStore::with_posts([post("a", PostStatus::Draft)]);
        let mut clash = post("b", PostStatus::Draft);
        clash.slug = "post-a".into();

        let err = store.upsert(clash).await.unwrap_err();
        assert_matches!(err, StoreError::Conflict(ref msg) if msg.contains("post-a"));

        // Re-saving the owner keeps its slug.
        let mut owner = post("a", PostStatus::Review);
        owner.title = "Renamed".into();
        assert_eq!(store.upsert(owner).await.unwrap().title, "Renamed");
    }

    #[tokio::test]
    async fn list_is_sorted_by_id() {
        let store = InMemoryPostStore::with_posts([
            post("b", PostStatus::Draft),
            post("a", PostStatus::Review),
        ]);
        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn publishing_stamps_published_at_once() {
        let store = InMemoryPostStore::with_posts([post("a", PostStatus::Scheduled)]);
        let first = store.set_status("a", PostStatus::Published).await.unwrap();
        let stamped = first.published_at.expect("published_at set");

        let second = store.set_status("a", PostStatus::Published).await.unwrap();
        assert_eq!(second.published_at, Some(stamped));
    }

    #[tokio::test]
    async fn set_status_on_unknown_post_is_not_found() {
        let store = InMemoryPostStore::new();
        let err = store.set_status("nope", PostStatus::Published).await.unwrap_err();
        assert_matches!(err, StoreError::NotFound(id) if id == "nope");
    }

    #[test]
    fn store_errors_convert_to_core_errors() {
        assert_matches!(
            CoreError::from(StoreError::NotFound("x".into())),
            CoreError::NotFound { entity: "Post", .. }
        );
        assert_matches!(
            CoreError::from(StoreError::Backend("down".into())),
            CoreError::Internal(_)
        );
        assert_matches!(
            CoreError::from(StoreError::slug_taken("dup")),
            CoreError::Conflict(msg) if msg.contains("'dup'")
        );
    }
}
