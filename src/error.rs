use campus_voice_types::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("conflict of interest: {reason}")]
    ConflictOfInterest {
        reason: String,
        /// Next authority in the hierarchy, when one exists.
        escalate_to: Option<Role>,
    },

    /// Non-fatal: no eligible handler for auto-routing. Only ever logged on
    /// the best-effort path; never surfaced as a creation failure.
    #[error("no handler available: {0}")]
    AssignmentUnavailable(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::PermissionDenied(_) => 403,
            Self::ValidationFailed(_) => 400,
            Self::ConflictOfInterest { .. } => 409,
            Self::AssignmentUnavailable(_) => 422,
            Self::Internal(_) => 500,
        }
    }
}
