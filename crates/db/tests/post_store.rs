//! Integration tests for the Postgres-backed post store.
//!
//! Each test runs against a fresh database with the crate migrations applied.

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use sitesync_core::post::{FeaturedImage, ImageDetails, Post, PostStatus};
use sitesync_core::store::{PostStore, StoreError};
use sitesync_db::PgPostStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn post(id: &str, status: PostStatus) -> Post {
    Post {
        id: id.into(),
        slug: format!("post-{id}"),
        title: format!("Post {id}"),
        body: "<p>Cheap eats and free museums.</p>".into(),
        featured_image: None,
        tags: vec!["travel".into()],
        categories: vec![],
        seo_title: None,
        meta_description: None,
        status,
        scheduled_at: None,
        published_at: None,
        version: None,
    }
}

// ---------------------------------------------------------------------------
// Test: upsert + get round-trips every column, including JSONB and arrays
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn upsert_then_get_round_trips_post(pool: PgPool) {
    let store = PgPostStore::new(pool);
    let mut original = post("p1", PostStatus::Scheduled);
    original.featured_image = Some(FeaturedImage::Detailed(ImageDetails {
        url: Some("https://cdn.example.com/paris.jpg".into()),
        alt: Some("Eiffel tower".into()),
        width: Some(1200),
        height: None,
    }));
    original.tags = vec!["travel".into(), "budget".into()];
    original.categories = vec!["europe".into()];
    original.seo_title = Some("Paris for less".into());
    original.scheduled_at = Some(Utc.with_ymd_and_hms(2026, 11, 1, 9, 30, 0).unwrap());
    original.version = Some(4);

    let saved = store.upsert(original.clone()).await.unwrap();
    assert_eq!(saved, original);

    let loaded = store.get("p1").await.unwrap().expect("post exists");
    assert_eq!(loaded, original);
}

#[sqlx::test(migrations = "./migrations")]
async fn bare_url_image_round_trips(pool: PgPool) {
    let store = PgPostStore::new(pool);
    let mut original = post("p1", PostStatus::Published);
    original.featured_image = Some(FeaturedImage::Url("https://cdn.example.com/a.jpg".into()));

    store.upsert(original.clone()).await.unwrap();

    let loaded = store.get("p1").await.unwrap().unwrap();
    assert_eq!(loaded.featured_image, original.featured_image);
}

// ---------------------------------------------------------------------------
// Test: upsert on an existing id replaces CMS-owned fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn upsert_replaces_existing_post(pool: PgPool) {
    let store = PgPostStore::new(pool);
    store.upsert(post("p1", PostStatus::Draft)).await.unwrap();

    let mut edited = post("p1", PostStatus::Review);
    edited.title = "Edited".into();
    edited.version = Some(2);
    store.upsert(edited).await.unwrap();

    let loaded = store.get("p1").await.unwrap().unwrap();
    assert_eq!(loaded.title, "Edited");
    assert_eq!(loaded.status, PostStatus::Review);
    assert_eq!(loaded.version, Some(2));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn get_unknown_post_returns_none_and_list_is_ordered(pool: PgPool) {
    let store = PgPostStore::new(pool);
    store.upsert(post("b", PostStatus::Draft)).await.unwrap();
    store.upsert(post("a", PostStatus::Draft)).await.unwrap();

    assert!(store.get("missing").await.unwrap().is_none());
    let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, ["a", "b"]);
}

// ---------------------------------------------------------------------------
// Test: unique slug index
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_slug_is_a_conflict(pool: PgPool) {
    let store = PgPostStore::new(pool);
    store.upsert(post("p1", PostStatus::Draft)).await.unwrap();

    let mut clash = post("p2", PostStatus::Draft);
    clash.slug = "post-p1".into();
    let err = store.upsert(clash).await.unwrap_err();

    assert_matches!(err, StoreError::Conflict(ref msg) if msg.contains("post-p1"));
    assert!(store.get("p2").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn empty_slugs_do_not_collide(pool: PgPool) {
    let store = PgPostStore::new(pool);
    for id in ["p1", "p2"] {
        let mut draft = post(id, PostStatus::Draft);
        draft.slug = String::new();
        store.upsert(draft).await.unwrap();
    }

    assert_eq!(store.list().await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: set_status stamps published_at once
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn publishing_stamps_published_at_once(pool: PgPool) {
    let store = PgPostStore::new(pool);
    store.upsert(post("p1", PostStatus::Scheduled)).await.unwrap();

    let first = store.set_status("p1", PostStatus::Published).await.unwrap();
    assert_eq!(first.status, PostStatus::Published);
    let stamped = first.published_at.expect("published_at is stamped");

    let second = store.set_status("p1", PostStatus::Published).await.unwrap();
    assert_eq!(second.published_at, Some(stamped));

    // Leaving the published state keeps the original stamp.
    let reverted = store.set_status("p1", PostStatus::Draft).await.unwrap();
    assert_eq!(reverted.status, PostStatus::Draft);
    assert_eq!(reverted.published_at, Some(stamped));
}

#[sqlx::test(migrations = "./migrations")]
async fn existing_published_at_is_kept(pool: PgPool) {
    let store = PgPostStore::new(pool);
    let earlier = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
    let mut original = post("p1", PostStatus::Review);
    original.published_at = Some(earlier);
    store.upsert(original).await.unwrap();

    let published = store.set_status("p1", PostStatus::Published).await.unwrap();
    assert_eq!(published.published_at, Some(earlier));
}

#[sqlx::test(migrations = "./migrations")]
async fn non_publish_status_does_not_stamp(pool: PgPool) {
    let store = PgPostStore::new(pool);
    store.upsert(post("p1", PostStatus::Draft)).await.unwrap();

    let reviewed = store.set_status("p1", PostStatus::Review).await.unwrap();
    assert_eq!(reviewed.status, PostStatus::Review);
    assert!(reviewed.published_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn set_status_on_unknown_post_is_not_found(pool: PgPool) {
    let store = PgPostStore::new(pool);

    let err = store.set_status("nope", PostStatus::Published).await.unwrap_err();

    assert_matches!(err, StoreError::NotFound(id) if id == "nope");
}
