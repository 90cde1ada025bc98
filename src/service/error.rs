//! Service error types.

use thiserror::Error;

use crate::domain::TaskId;
use crate::infrastructure::RepositoryError;

/// Errors surfaced by [`TaskService`](super::TaskService).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A required parameter is missing or a parameter is out of range.
    ///
    /// Raised before the repository is touched.
    #[error("Incorrect data: {0}")]
    IncorrectData(String),

    /// No task exists with the requested id.
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    /// The repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Creates an [`ServiceError::IncorrectData`] for a missing parameter.
    #[must_use]
    pub fn missing_param(name: &str) -> Self {
        Self::IncorrectData(format!("missed param: {name}"))
    }

    /// Returns `true` for validation failures.
    #[must_use]
    pub const fn is_incorrect_data(&self) -> bool {
        matches!(self, Self::IncorrectData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_missing_param_message() {
        let error = ServiceError::missing_param("email");
        assert_eq!(error.to_string(), "Incorrect data: missed param: email");
        assert!(error.is_incorrect_data());
    }

    #[rstest]
    fn test_not_found_display() {
        let error = ServiceError::NotFound(TaskId::new(99));
        assert_eq!(error.to_string(), "Task not found: 99");
        assert!(!error.is_incorrect_data());
    }

    #[rstest]
    fn test_repository_error_is_transparent() {
        let error: ServiceError =
            RepositoryError::DatabaseError("connection reset".to_string()).into();
        assert_eq!(error.to_string(), "Database error: connection reset");
    }
}
