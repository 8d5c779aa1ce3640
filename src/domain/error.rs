use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Random source error: {message}")]
    RandomSource { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn random_source(message: impl Into<String>) -> Self {
        Self::RandomSource {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Permission 'task.create' not found");
        assert_eq!(
            error.to_string(),
            "Not found: Permission 'task.create' not found"
        );
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Owner cannot be empty");
        assert_eq!(error.to_string(), "Validation error: Owner cannot be empty");
    }

    #[test]
    fn test_conflict_error() {
        let error = DomainError::conflict("Key digest already registered");
        assert_eq!(error.to_string(), "Conflict: Key digest already registered");
    }

    #[test]
    fn test_sqlx_error_maps_to_storage() {
        let error: DomainError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(error, DomainError::Storage { .. }));
    }
}
