//! Request handlers.
//!
//! Handlers delegate to the post store and the sync dispatcher and map
//! errors via [`crate::error::AppError`].

pub mod posts;
pub mod sync_log;
