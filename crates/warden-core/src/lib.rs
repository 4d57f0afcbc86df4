//! Warden Core - Shared types, credential hashing, and lock policy
//!
//! This crate provides the foundational types for the Warden device-lock and
//! page-lock subsystem embedded in the Dockeep document-expiry client.

pub mod error;
pub mod hasher;
pub mod model;
pub mod policy;
pub mod types;

pub use error::{Error, Result};
pub use hasher::{hash_credential, verify_credential};
pub use model::{
    AttemptState, PageLockRecord, SecurityEvent, SecurityEventType, SecuritySettings,
};
pub use policy::LockPolicy;
pub use types::{CredentialHash, LockType, Page, UserId};

/// Default maximum failed unlock attempts before lockout or wipe
pub const DEFAULT_MAX_UNLOCK_ATTEMPTS: u32 = 3;

/// Exact digit count required for a page-lock PIN
pub const PIN_LENGTH: usize = 6;

/// Minimum length for a page-lock password
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum length for the device-wide idle-lock credential
pub const MIN_IDLE_CREDENTIAL_LENGTH: usize = 6;
