//! Error types for the Warden service layer

use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur in the service layer
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Core library error (validation, lockout, storage)
    #[error("Core error: {0}")]
    Core(#[from] warden_core::Error),

    /// Biometric gateway error
    #[error("Biometric gateway error: {0}")]
    Biometric(String),

    /// Session provider error
    #[error("Session error: {0}")]
    Session(String),

    /// Operation not valid in the controller's current state
    #[error("Invalid lock state for this operation: {0}")]
    InvalidState(&'static str),
}

impl ServiceError {
    /// Shorthand for a storage-backed failure
    pub fn storage(msg: impl Into<String>) -> Self {
        ServiceError::Core(warden_core::Error::Storage(msg.into()))
    }
}
