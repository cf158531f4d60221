use peergrade_state::StorageError;

/// Errors surfaced by the classroom service.
#[derive(Debug, thiserror::Error)]
pub enum ClassroomError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The acting user lacks the role or membership for this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<StorageError> for ClassroomError {
    fn from(err: StorageError) -> Self {
        ClassroomError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for ClassroomError {
    fn from(err: serde_json::Error) -> Self {
        ClassroomError::Store(format!("corrupt document: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, ClassroomError>;
