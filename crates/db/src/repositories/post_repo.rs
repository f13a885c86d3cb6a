//! Repository for the `posts` table.

use sitesync_core::post::{Post, PostStatus};
use sqlx::PgPool;

use crate::models::post::{featured_image_json, PostRow};

/// Column list for `posts` queries.
const COLUMNS: &str = "\
    id, slug, title, body, featured_image, tags, categories, seo_title, \
    meta_description, status, scheduled_at, published_at, version, \
    created_at, updated_at";

/// Provides CRUD operations for posts.
pub struct PostRepo;

impl PostRepo {
    /// Find a post by its ID.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<PostRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, PostRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all posts ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<PostRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts ORDER BY id");
        sqlx::query_as::<_, PostRow>(&query).fetch_all(pool).await
    }

    /// Insert a post, or replace every CMS-owned field if the id exists.
    pub async fn upsert(pool: &PgPool, post: &Post) -> Result<PostRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (id, slug, title, body, featured_image, tags, categories, \
                 seo_title, meta_description, status, scheduled_at, published_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (id) DO UPDATE SET \
                 slug = EXCLUDED.slug, title = EXCLUDED.title, body = EXCLUDED.body, \
                 featured_image = EXCLUDED.featured_image, tags = EXCLUDED.tags, \
                 categories = EXCLUDED.categories, seo_title = EXCLUDED.seo_title, \
                 meta_description = EXCLUDED.meta_description, status = EXCLUDED.status, \
                 scheduled_at = EXCLUDED.scheduled_at, published_at = EXCLUDED.published_at, \
                 version = EXCLUDED.version, updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PostRow>(&query)
            .bind(&post.id)
            .bind(&post.slug)
            .bind(&post.title)
            .bind(&post.body)
            .bind(featured_image_json(post))
            .bind(&post.tags)
            .bind(&post.categories)
            .bind(post.seo_title.as_deref())
            .bind(post.meta_description.as_deref())
            .bind(post.status.as_str())
            .bind(post.scheduled_at)
            .bind(post.published_at)
            .bind(post.version)
            .fetch_one(pool)
            .await
    }

    /// Set the status of a post. Publishing stamps `published_at` when unset.
    ///
    /// Returns `None` if no row with the given id exists.
    pub async fn update_status(
        pool: &PgPool,
        id: &str,
        status: PostStatus,
    ) -> Result<Option<PostRow>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET status = $2, \
                 published_at = CASE WHEN $2 = 'published' \
                     THEN COALESCE(published_at, NOW()) ELSE published_at END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PostRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
