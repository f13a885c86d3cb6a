//! Row model for the `posts` table.

use sitesync_core::error::CoreError;
use sitesync_core::post::{FeaturedImage, Post, PostStatus};
use sitesync_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `posts` table.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub featured_image: Option<serde_json::Value>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub seo_title: Option<String>,
    pub meta_description: Option<String>,
    pub status: String,
    pub scheduled_at: Option<Timestamp>,
    pub published_at: Option<Timestamp>,
    pub version: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PostRow> for Post {
    type Error = CoreError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let status: PostStatus = row.status.parse()?;
        let featured_image = row
            .featured_image
            .filter(|v| !v.is_null())
            .map(serde_json::from_value::<FeaturedImage>)
            .transpose()
            .map_err(|e| {
                CoreError::Internal(format!(
                    "Post {} has an unreadable featured_image: {e}",
                    row.id
                ))
            })?;

        Ok(Post {
            id: row.id,
            slug: row.slug,
            title: row.title,
            body: row.body,
            featured_image,
            tags: row.tags,
            categories: row.categories,
            seo_title: row.seo_title,
            meta_description: row.meta_description,
            status,
            scheduled_at: row.scheduled_at,
            published_at: row.published_at,
            version: row.version,
        })
    }
}

/// JSONB representation of a post's featured image.
pub fn featured_image_json(post: &Post) -> Option<serde_json::Value> {
    post.featured_image
        .as_ref()
        .and_then(|image| serde_json::to_value(image).ok())
}
