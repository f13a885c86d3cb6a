//! Domain core for outbound site synchronization.
//!
//! - [`post`] -- the CMS post record as seen by the sync subsystem.
//! - [`payload`] -- validation and normalization into the external wire payload.
//! - [`html`] -- plain-text extraction and excerpt truncation.
//! - [`sync_log`] -- audit record types for every sync attempt.
//! - [`store`] -- the `PostStore` repository seam and its in-memory fallback.

pub mod error;
pub mod html;
pub mod payload;
pub mod post;
pub mod store;
pub mod sync_log;
pub mod types;
