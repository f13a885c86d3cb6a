//! Payload builder: validates a post's readiness for external publication
//! and produces the canonical wire payload.
//!
//! Rules are checked in a fixed order and the first violation wins. The
//! builder is pure; it never touches the network or the sync log.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::html::{strip_html, truncate_excerpt};
use crate::post::{FeaturedImage, Post, PostStatus};
use crate::types::Timestamp;

/// Accepted slug shape: lowercase alphanumeric words joined by single hyphens.
pub const SLUG_PATTERN: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(SLUG_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Normalized featured image as sent to the external site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncImage {
    pub url: String,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoFields {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// The external representation of a post. Rebuilt from the current post on
/// every sync call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSyncPayload {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub body: String,
    pub featured_image: Option<SyncImage>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub seo: SeoFields,
    pub status: PostStatus,
    pub scheduled_at: Option<Timestamp>,
    pub published_at: Option<Timestamp>,
    pub version: i64,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Validate `post` and build its [`PostSyncPayload`].
///
/// Every failure is a [`CoreError::Validation`].
pub fn build_post_payload(post: &Post) -> Result<PostSyncPayload, CoreError> {
    if !post.status.is_syncable() {
        return Err(CoreError::Validation(format!(
            "Only published or scheduled posts can be synced (status is '{}')",
            post.status
        )));
    }

    let title = post.title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("Post title is required".into()));
    }

    let slug = post.slug.trim();
    if slug.is_empty() {
        return Err(CoreError::Validation("Post slug is required".into()));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Expected lowercase kebab-case (e.g. 'paris-on-a-budget')"
        )));
    }

    if post.body.trim().is_empty() {
        return Err(CoreError::Validation("Post body is required".into()));
    }

    if post.tags.is_empty() {
        return Err(CoreError::Validation("At least one tag is required".into()));
    }

    let plain_text = strip_html(&post.body);
    if plain_text.is_empty() {
        return Err(CoreError::Validation(
            "Post body must contain text content, not only markup".into(),
        ));
    }

    if post.status == PostStatus::Scheduled && post.scheduled_at.is_none() {
        return Err(CoreError::Validation(
            "Scheduled posts require a scheduledAt date".into(),
        ));
    }

    let featured_image = normalize_featured_image(post.featured_image.as_ref())?;

    let meta_description = non_blank(post.meta_description.as_deref());
    let excerpt_source = meta_description.clone().unwrap_or(plain_text);

    Ok(PostSyncPayload {
        title: title.to_string(),
        slug: slug.to_string(),
        excerpt: truncate_excerpt(&excerpt_source),
        body: post.body.clone(),
        featured_image,
        tags: post.tags.clone(),
        categories: post.categories.clone(),
        seo: SeoFields {
            title: non_blank(post.seo_title.as_deref()),
            description: meta_description,
        },
        status: post.status,
        scheduled_at: post.scheduled_at,
        published_at: post.published_at,
        version: post.effective_version(),
    })
}

/// Normalize the CMS image field into a [`SyncImage`].
///
/// A blank bare string counts as no image.
fn normalize_featured_image(
    image: Option<&FeaturedImage>,
) -> Result<Option<SyncImage>, CoreError> {
    match image {
        None => Ok(None),
        Some(FeaturedImage::Url(raw)) => {
            let url = raw.trim();
            if url.is_empty() {
                return Ok(None);
            }
            if !is_absolute_http_url(url) {
                return Err(CoreError::Validation(format!(
                    "Featured image '{url}' must be an absolute http(s) URL"
                )));
            }
            Ok(Some(SyncImage {
                url: url.to_string(),
                alt: None,
                width: None,
                height: None,
            }))
        }
        Some(FeaturedImage::Detailed(details)) => {
            let url = details.url.as_deref().map(str::trim).unwrap_or_default();
            if !is_absolute_http_url(url) {
                return Err(CoreError::Validation(
                    "Featured image object must have a 'url' that is an absolute http(s) URL"
                        .into(),
                ));
            }
            Ok(Some(SyncImage {
                url: url.to_string(),
                alt: details.alt.clone(),
                width: details.width,
                height: details.height,
            }))
        }
    }
}

/// True when `candidate` parses as an `http`/`https` URL with a host.
pub fn is_absolute_http_url(candidate: &str) -> bool {
    match url::Url::parse(candidate) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
