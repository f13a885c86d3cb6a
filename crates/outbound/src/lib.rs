//! Outbound synchronization of CMS posts to the main website.
//!
//! - [`SyncDispatcher`] -- the attempt loop: payload, idempotency key,
//!   bounded retries, and an audit entry for every transition.
//! - [`RetryPolicy`] -- attempt cap and backoff between attempts.
//! - [`SyncTransport`] -- the HTTP seam; [`ReqwestTransport`] in production.
//! - [`SyncLogSink`] -- the audit-log seam; [`FileSyncLog`] persists a
//!   bounded JSON ring on disk.
//! - [`publish`] -- two-phase publish (sync, then flip local status) for one
//!   or many posts.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod log_store;
pub mod publish;
pub mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

pub use config::SyncConfig;
pub use dispatcher::{PostSyncResult, SyncDispatcher};
pub use error::{SyncError, SyncErrorKind};
pub use log_store::{FileSyncLog, MemorySyncLog, SyncLogError, SyncLogSink};
pub use retry::{Backoff, RetryPolicy};
pub use transport::{
    OutboundRequest, ReqwestTransport, SyncTransport, TransportError, TransportResponse,
};
