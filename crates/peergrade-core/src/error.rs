//! Domain-level error taxonomy for evaluation records.

use peergrade_state::StorageError;

/// Errors surfaced by evaluation operations.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// A required field is missing or empty.
    #[error("validation error: {0}")]
    Validation(String),

    /// The identifier does not resolve to a stored record.
    #[error("evaluation not found: {0}")]
    NotFound(String),

    /// The record store is unreachable or rejected the operation.
    #[error("store error: {0}")]
    Store(String),
}

impl From<StorageError> for EvalError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EvaluationNotFound { id } => EvalError::NotFound(id),
            other => EvalError::Store(other.to_string()),
        }
    }
}

/// Result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_preserved_from_storage() {
        let err: EvalError = StorageError::EvaluationNotFound {
            id: "abc".to_string(),
        }
        .into();
        assert!(matches!(err, EvalError::NotFound(ref id) if id == "abc"));
    }

    #[test]
    fn test_backend_failures_become_store_errors() {
        let err: EvalError = StorageError::Backend("connection refused".to_string()).into();
        assert!(matches!(err, EvalError::Store(_)));
        assert!(err.to_string().contains("connection refused"));

        let err: EvalError = StorageError::DuplicateEvaluation {
            id: "x".to_string(),
        }
        .into();
        assert!(matches!(err, EvalError::Store(_)));
    }

    #[test]
    fn test_display() {
        let err = EvalError::Validation("comments is required".to_string());
        assert_eq!(err.to_string(), "validation error: comments is required");
    }
}
