//! Error types for the ACL engine

use thiserror::Error;

/// Result type alias using AclError
pub type Result<T> = std::result::Result<T, AclError>;

/// ACL engine errors
#[derive(Error, Debug)]
pub enum AclError {
    /// Contract violation by the caller (e.g. granting a mode twice)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource or ACL document not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote patch rejected (e.g. concurrent edit)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Internal engine error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AclError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AclError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        AclError::NotFound(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        AclError::Conflict(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        AclError::Network(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        AclError::Internal(msg.into())
    }
}
