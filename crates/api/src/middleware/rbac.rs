//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sitesync_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";

/// Requires `admin` or `editor`. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn publish(RequirePublisher(user): RequirePublisher) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequirePublisher(pub AuthUser);

impl FromRequestParts<AppState> for RequirePublisher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_EDITOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin or editor role required to publish to the main website".into(),
            )));
        }
        Ok(RequirePublisher(user))
    }
}
