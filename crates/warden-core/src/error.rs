//! Error types for the Warden core library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("PIN must be exactly {0} digits")]
    InvalidPin(usize),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Credential must be at least {0} characters")]
    CredentialTooShort(usize),

    #[error("Credentials do not match")]
    CredentialMismatch,

    #[error("Locked out for {0} seconds")]
    LockedOut(u64),

    #[error("No lock configured for page: {0}")]
    NoLockConfigured(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
