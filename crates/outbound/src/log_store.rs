//! Append-only, bounded audit journal of sync attempts.
//!
//! The journal is a FIFO ring: once `capacity` entries exist, each append
//! evicts the oldest entry. Old history is lost in exchange for bounded disk
//! use.
//!
//! [`FileSyncLog`] rewrites the whole JSON array on every append. Appends are
//! serialized within one process; separate processes sharing the file are
//! not coordinated and can lose entries under concurrent writes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sitesync_core::sync_log::{NewSyncLogEntry, SyncLogEntry};
use tokio::sync::Mutex;

/// Default journal location, relative to the working directory.
pub const DEFAULT_SYNC_LOG_PATH: &str = "data/sync-log.json";

/// Default number of retained entries.
pub const DEFAULT_SYNC_LOG_CAPACITY: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum SyncLogError {
    #[error("Sync log I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sync log at {} is not a valid JSON array: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize sync log: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Destination for sync audit entries.
#[async_trait]
pub trait SyncLogSink: Send + Sync {
    /// Append one entry, stamping it with an id and the append time.
    async fn append(&self, entry: NewSyncLogEntry) -> Result<SyncLogEntry, SyncLogError>;

    /// All retained entries, oldest first.
    async fn entries(&self) -> Result<Vec<SyncLogEntry>, SyncLogError>;
}

/// Push `entry` and evict from the front until at most `capacity` remain.
fn push_bounded(entries: &mut Vec<SyncLogEntry>, entry: SyncLogEntry, capacity: usize) {
    entries.push(entry);
    if entries.len() > capacity {
        let excess = entries.len() - capacity;
        entries.drain(..excess);
    }
}

// ---------------------------------------------------------------------------
// File-backed journal
// ---------------------------------------------------------------------------

/// JSON-array journal on disk, pretty-printed.
pub struct FileSyncLog {
    path: PathBuf,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl FileSyncLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(path, DEFAULT_SYNC_LOG_CAPACITY)
    }

    pub fn with_capacity(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity: capacity.max(1),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the journal; a missing file is an empty journal.
    async fn read_all(&self) -> Result<Vec<SyncLogEntry>, SyncLogError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SyncLogError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| SyncLogError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, entries: &[SyncLogEntry]) -> Result<(), SyncLogError> {
        let json = serde_json::to_vec_pretty(entries).map_err(SyncLogError::Serialize)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| SyncLogError::Io {
                path: self.path.clone(),
                source,
            })
    }

    async fn ensure_parent_dir(&self) -> Result<(), SyncLogError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| SyncLogError::Io {
                    path: dir.to_path_buf(),
                    source,
                }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SyncLogSink for FileSyncLog {
    async fn append(&self, entry: NewSyncLogEntry) -> Result<SyncLogEntry, SyncLogError> {
        let _guard = self.write_lock.lock().await;

        self.ensure_parent_dir().await?;
        let mut entries = self.read_all().await?;
        let stamped = entry.stamp(chrono::Utc::now());
        push_bounded(&mut entries, stamped.clone(), self.capacity);
        self.write_all(&entries).await?;

        Ok(stamped)
    }

    async fn entries(&self) -> Result<Vec<SyncLogEntry>, SyncLogError> {
        let _guard = self.write_lock.lock().await;
        self.read_all().await
    }
}

// ---------------------------------------------------------------------------
// In-memory journal
// ---------------------------------------------------------------------------

/// Process-local ring with the same eviction rules as [`FileSyncLog`].
pub struct MemorySyncLog {
    capacity: usize,
    entries: Mutex<Vec<SyncLogEntry>>,
}

impl MemorySyncLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SYNC_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemorySyncLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyncLogSink for MemorySyncLog {
    async fn append(&self, entry: NewSyncLogEntry) -> Result<SyncLogEntry, SyncLogError> {
        let stamped = entry.stamp(chrono::Utc::now());
        let mut entries = self.entries.lock().await;
        push_bounded(&mut entries, stamped.clone(), self.capacity);
        Ok(stamped)
    }

    async fn entries(&self) -> Result<Vec<SyncLogEntry>, SyncLogError> {
        Ok(self.entries.lock().await.clone())
    }
}
