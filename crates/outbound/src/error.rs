use sitesync_core::error::CoreError;

use crate::log_store::SyncLogError;

/// Coarse classification of a [`SyncError`].
///
/// The HTTP layer maps kinds to response codes; the core never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    Configuration,
    Validation,
    NotFound,
    Transport,
    Log,
    Internal,
}

/// Unrecoverable failure of a sync call.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Validation, configuration, or lookup failure from the domain core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Every attempt failed. `status` is the last remote HTTP status, or
    /// `None` when the last attempt never got a response.
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
        details: Option<String>,
    },

    /// The audit log could not be written.
    #[error(transparent)]
    Log(#[from] SyncLogError),
}

impl SyncError {
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::Core(CoreError::Validation(_)) => SyncErrorKind::Validation,
            SyncError::Core(CoreError::Configuration(_)) => SyncErrorKind::Configuration,
            SyncError::Core(CoreError::NotFound { .. }) => SyncErrorKind::NotFound,
            SyncError::Core(
                CoreError::Conflict(_)
                | CoreError::Unauthorized(_)
                | CoreError::Forbidden(_)
                | CoreError::Internal(_),
            ) => SyncErrorKind::Internal,
            SyncError::Transport { .. } => SyncErrorKind::Transport,
            SyncError::Log(_) => SyncErrorKind::Log,
        }
    }

    /// Remote HTTP status for transport failures that received a response.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            SyncError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Diagnostic details (response snippet or exception message).
    pub fn details(&self) -> Option<&str> {
        match self {
            SyncError::Transport { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}
