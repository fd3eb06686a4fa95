//! Error types for the permission service.

use branchwp_rules::CodecError;
use thiserror::Error;

use crate::store::StoreError;

/// Permission service error types.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The configuration store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A rule cannot be stored
    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] CodecError),

    /// The user may not write the branch
    #[error("no write permissions for the branch {branch}")]
    WriteDenied {
        /// The refused branch.
        branch: String,
    },

    /// Configuration payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for permission service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Check if this error should be logged at error level.
    ///
    /// Refused writes and invalid rules are expected outcomes.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServiceError::Store(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidRule(_) | ServiceError::Serialization(_) => 400,
            ServiceError::WriteDenied { .. } => 403,
            ServiceError::Store(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Store(_) => "STORE_ERROR",
            ServiceError::InvalidRule(_) => "INVALID_RULE",
            ServiceError::WriteDenied { .. } => "WRITE_DENIED",
            ServiceError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
