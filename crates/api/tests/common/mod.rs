#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use sitesync_api::auth::jwt::{generate_access_token, JwtConfig};
use sitesync_api::config::ServerConfig;
use sitesync_api::router::build_app_router;
use sitesync_api::state::AppState;
use sitesync_core::post::{Post, PostStatus};
use sitesync_core::store::{InMemoryPostStore, PostStore, StoreError};
use sitesync_outbound::testing::StubTransport;
use sitesync_outbound::{MemorySyncLog, RetryPolicy, SyncConfig, SyncDispatcher, SyncLogSink};

pub const TEST_BASE_URL: &str = "https://site.example.com";
pub const TEST_API_KEY: &str = "test-api-key";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        bulk_publish_timeout_secs: 1800,
        shutdown_timeout_secs: 30,
        sync_log_path: PathBuf::from("unused-in-tests.json"),
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Handles a test keeps after building the app.
pub struct TestApp {
    pub router: Router,
    pub sync_log: Arc<MemorySyncLog>,
    pub transport: Option<Arc<StubTransport>>,
}

/// Build the full application router over `posts`.
///
/// With `transport` set, sync actions go through a dispatcher that retries
/// immediately; without it, sync is left unconfigured.
pub fn build_test_app_with(
    posts: Arc<dyn PostStore>,
    transport: Option<StubTransport>,
) -> TestApp {
    build_test_app_with_retry(posts, transport, RetryPolicy::immediate(3))
}

/// Like [`build_test_app_with`], with an explicit retry policy.
pub fn build_test_app_with_retry(
    posts: Arc<dyn PostStore>,
    transport: Option<StubTransport>,
    retry: RetryPolicy,
) -> TestApp {
    let config = test_config();
    let sync_log = Arc::new(MemorySyncLog::new());
    let transport = transport.map(Arc::new);

    let dispatcher = transport.as_ref().map(|t| {
        let sync_config = SyncConfig::new(TEST_BASE_URL, TEST_API_KEY).unwrap();
        Arc::new(
            SyncDispatcher::new(
                sync_config,
                Arc::clone(t) as Arc<dyn sitesync_outbound::SyncTransport>,
                Arc::clone(&sync_log) as Arc<dyn SyncLogSink>,
            )
            .with_retry_policy(retry),
        )
    });

    let state = AppState {
        config: Arc::new(config.clone()),
        posts,
        sync_log: Arc::clone(&sync_log) as Arc<dyn SyncLogSink>,
        dispatcher,
        db_pool: None,
    };

    TestApp {
        router: build_app_router(state, &config),
        sync_log,
        transport,
    }
}

/// Build the app over an in-memory store seeded with `posts`.
pub fn build_test_app(posts: Vec<Post>, transport: Option<StubTransport>) -> TestApp {
    build_test_app_with(Arc::new(InMemoryPostStore::with_posts(posts)), transport)
}

/// A post that passes payload validation.
pub fn sample_post(id: &str, status: PostStatus) -> Post {
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

/// Store whose status updates always fail; reads go to the inner store.
pub struct FrozenStatusStore(pub InMemoryPostStore);

#[async_trait]
impl PostStore for FrozenStatusStore {
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
        Err(StoreError::Backend("status column is locked".into()))
    }
}

/// Bearer token for a user with `role`.
pub fn token_for(role: &str) -> String {
    generate_access_token("user-1", role, &test_config().jwt).unwrap()
}

/// Send a request with an optional bearer token and JSON body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, token, Some(body)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
