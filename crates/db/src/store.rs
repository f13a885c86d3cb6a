use async_trait::async_trait;
use sitesync_core::post::{Post, PostStatus};
use sitesync_core::store::{PostStore, StoreError};
use sqlx::PgPool;

use crate::models::post::PostRow;
use crate::repositories::PostRepo;

/// [`PostStore`] backed by the `posts` table.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn to_post(row: PostRow) -> Result<Post, StoreError> {
    Post::try_from(row).map_err(backend)
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        PostRepo::find_by_id(&self.pool, id)
            .await
            .map_err(backend)?
            .map(to_post)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        PostRepo::list(&self.pool)
            .await
            .map_err(backend)?
            .into_iter()
            .map(to_post)
            .collect()
    }

    async fn upsert(&self, post: Post) -> Result<Post, StoreError> {
        let row = PostRepo::upsert(&self.pool, &post)
            .await
            .map_err(|err| {
                if let sqlx::Error::Database(db) = &err {
                    if db.is_unique_violation() {
                        return StoreError::slug_taken(&post.slug);
                    }
                }
                backend(err)
            })?;
        to_post(row)
    }

    async fn set_status(&self, id: &str, status: PostStatus) -> Result<Post, StoreError> {
        let row = PostRepo::update_status(&self.pool, id, status)
            .await
            .map_err(backend)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        tracing::debug!(post_id = id, %status, "Post status updated");
        to_post(row)
    }
}
