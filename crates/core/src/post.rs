//! The CMS post record, restricted to the fields the sync subsystem reads.
//!
//! Posts are owned by the CMS. The sync core only reads them; callers flip
//! the local status after a confirmed sync through a [`crate::store::PostStore`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{PostId, Timestamp};

/// Editorial lifecycle status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Review,
    Scheduled,
    Published,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }

    /// Only published and scheduled posts may leave the CMS.
    pub fn is_syncable(self) -> bool {
        matches!(self, Self::Published | Self::Scheduled)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "review" => Ok(Self::Review),
            "scheduled" => Ok(Self::Scheduled),
            "published" => Ok(Self::Published),
            other => Err(CoreError::Validation(format!(
                "Unknown post status '{other}'. Must be one of: draft, review, scheduled, published"
            ))),
        }
    }
}

/// Featured image as stored by the CMS: either a bare URL or a detailed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeaturedImage {
    Url(String),
    Detailed(ImageDetails),
}

/// Object form of a featured image. `url` may be missing in malformed records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetails {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A CMS post. Fields default leniently so malformed records reach the
/// payload builder and fail there with a precise message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub featured_image: Option<FeaturedImage>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    pub status: PostStatus,
    #[serde(default)]
    pub scheduled_at: Option<Timestamp>,
    #[serde(default)]
    pub published_at: Option<Timestamp>,
    #[serde(default)]
    pub version: Option<i64>,
}

impl Post {
    /// Version sent over the wire; unversioned posts count as version 1.
    pub fn effective_version(&self) -> i64 {
        self.version.unwrap_or(1)
    }
}
