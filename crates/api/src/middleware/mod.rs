//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequirePublisher`] -- Requires a role allowed to push content to the main website.

pub mod auth;
pub mod rbac;
