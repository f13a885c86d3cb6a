use std::time::Duration;

use sitesync_core::error::CoreError;

/// Default per-attempt HTTP timeout.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the main website's sync endpoint.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Absolute http(s) base URL with trailing slashes removed.
    pub base_url: String,
    /// Sent as the `x-api-key` header.
    pub api_key: String,
    /// Transport-level timeout for a single attempt.
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Validate and build a config from explicit values.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, CoreError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(CoreError::Configuration(
                "ADMIN_SITE_SYNC_URL is not configured".into(),
            ));
        }
        let parsed = url::Url::parse(base_url).map_err(|e| {
            CoreError::Configuration(format!("ADMIN_SITE_SYNC_URL is not a valid URL: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CoreError::Configuration(
                "ADMIN_SITE_SYNC_URL must be an absolute http(s) URL".into(),
            ));
        }

        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(CoreError::Configuration(
                "ADMIN_SITE_API_KEY is not configured".into(),
            ));
        }

        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default |
    /// |-----------------------------|----------|---------|
    /// | `ADMIN_SITE_SYNC_URL`       | **yes**  | --      |
    /// | `ADMIN_SITE_API_KEY`        | **yes**  | --      |
    /// | `SYNC_REQUEST_TIMEOUT_SECS` | no       | `30`    |
    pub fn from_env() -> Result<Self, CoreError> {
        let base_url = std::env::var("ADMIN_SITE_SYNC_URL").unwrap_or_default();
        let api_key = std::env::var("ADMIN_SITE_API_KEY").unwrap_or_default();
        let mut config = Self::new(&base_url, &api_key)?;

        if let Ok(raw) = std::env::var("SYNC_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                CoreError::Configuration("SYNC_REQUEST_TIMEOUT_SECS must be a valid u64".into())
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Endpoint receiving post payloads.
    pub fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }
}
