//! Service Errors
//!
//! TigerStyle: One typed taxonomy for everything the entity services reject.

use crate::store::StoreError;

/// Result type for entity service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures raised by the entity services.
///
/// The transport maps each variant to a distinct status code; callers past
/// the client only ever see the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Requested id is absent
    #[error("{kind} with ID {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    /// Duplicate email or username
    #[error("{0}")]
    Conflict(String),

    /// Missing or malformed field, rejected before touching the store
    #[error("{0}")]
    Validation(String),
}

impl ServiceError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Short error class, as shown in the transport's error body.
    pub fn class(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Not Found",
            Self::Conflict(_) => "Conflict",
            Self::Validation(_) => "Bad Request",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ServiceError::NotFound { kind: "User", id: 42 };
        assert_eq!(err.to_string(), "User with ID 42 not found");
        assert_eq!(err.class(), "Not Found");
    }

    #[test]
    fn test_store_error_conversion() {
        let err: ServiceError = StoreError::NotFound { kind: "Post", id: 7 }.into();
        assert_eq!(err, ServiceError::NotFound { kind: "Post", id: 7 });
    }
}
