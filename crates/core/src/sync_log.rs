//! Audit records for outbound sync attempts.
//!
//! Every state transition of a sync call produces one [`SyncLogEntry`]. All
//! entries of one call share an idempotency key.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Timestamp;

/// Entity label for post syncs.
pub const ENTITY_POST: &str = "post";

/// Action label for outbound syncs.
pub const ACTION_SYNC: &str = "sync";

/// Maximum characters of a response body kept in a log entry.
pub const RESPONSE_SNIPPET_MAX_CHARS: usize = 500;

/// State of one attempt within a sync call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncStatus {
    Pending,
    Sent,
    Confirmed,
    Failed,
}

/// An entry as produced by the dispatcher, before the sink stamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSyncLogEntry {
    pub entity: &'static str,
    pub entity_id: String,
    pub action: &'static str,
    /// 0 for the PENDING entry, 1-based afterwards.
    pub attempt: u32,
    pub status: SyncStatus,
    pub http_code: Option<u16>,
    pub response_snippet: Option<String>,
    pub idempotency_key: Uuid,
    pub version: i64,
}

impl NewSyncLogEntry {
    /// Entry for a post sync with no HTTP outcome attached.
    pub fn post_sync(
        post_id: &str,
        attempt: u32,
        status: SyncStatus,
        idempotency_key: Uuid,
        version: i64,
    ) -> Self {
        Self {
            entity: ENTITY_POST,
            entity_id: post_id.to_string(),
            action: ACTION_SYNC,
            attempt,
            status,
            http_code: None,
            response_snippet: None,
            idempotency_key,
            version,
        }
    }

    pub fn with_http_code(mut self, code: u16) -> Self {
        self.http_code = Some(code);
        self
    }

    /// Attach a response snippet, truncated to [`RESPONSE_SNIPPET_MAX_CHARS`].
    pub fn with_snippet(mut self, text: &str) -> Self {
        self.response_snippet = Some(snippet(text));
        self
    }

    /// Assign an id and the append-time timestamp.
    pub fn stamp(self, timestamp: Timestamp) -> SyncLogEntry {
        SyncLogEntry {
            id: Uuid::new_v4(),
            entity: self.entity.to_string(),
            entity_id: self.entity_id,
            action: self.action.to_string(),
            attempt: self.attempt,
            status: self.status,
            http_code: self.http_code,
            response_snippet: self.response_snippet,
            timestamp,
            idempotency_key: self.idempotency_key,
            version: self.version,
        }
    }
}

/// A persisted audit record. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogEntry {
    pub id: Uuid,
    pub entity: String,
    pub entity_id: String,
    pub action: String,
    pub attempt: u32,
    pub status: SyncStatus,
    #[serde(default)]
    pub http_code: Option<u16>,
    #[serde(default)]
    pub response_snippet: Option<String>,
    pub timestamp: Timestamp,
    pub idempotency_key: Uuid,
    pub version: i64,
}

/// First [`RESPONSE_SNIPPET_MAX_CHARS`] characters of `text`.
pub fn snippet(text: &str) -> String {
    text.chars().take(RESPONSE_SNIPPET_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_value(SyncStatus::Confirmed).unwrap(), "CONFIRMED");
        assert_eq!(
            serde_json::from_value::<SyncStatus>(serde_json::json!("PENDING")).unwrap(),
            SyncStatus::Pending
        );
    }

    #[test]
    fn snippet_is_bounded() {
        let long = "x".repeat(2_000);
        assert_eq!(snippet(&long).chars().count(), RESPONSE_SNIPPET_MAX_CHARS);
        assert_eq!(snippet("ok"), "ok");
    }

    #[test]
    fn stamp_preserves_fields_and_assigns_id() {
        let key = Uuid::new_v4();
        let now = chrono::Utc::now();
        let entry = NewSyncLogEntry::post_sync("p1", 2, SyncStatus::Failed, key, 7)
            .with_http_code(503)
            .with_snippet("unavailable")
            .stamp(now);

        assert_eq!(entry.entity, ENTITY_POST);
        assert_eq!(entry.action, ACTION_SYNC);
        assert_eq!(entry.attempt, 2);
        assert_eq!(entry.http_code, Some(503));
        assert_eq!(entry.response_snippet.as_deref(), Some("unavailable"));
        assert_eq!(entry.idempotency_key, key);
        assert_eq!(entry.timestamp, now);
        assert_eq!(entry.version, 7);
    }

    #[test]
    fn entry_json_uses_camel_case() {
        let entry = NewSyncLogEntry::post_sync("p1", 0, SyncStatus::Pending, Uuid::new_v4(), 1)
            .stamp(chrono::Utc::now());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["entityId"], "p1");
        assert!(json["idempotencyKey"].is_string());
        assert!(json["httpCode"].is_null());
    }
}
