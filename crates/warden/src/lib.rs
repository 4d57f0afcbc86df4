//! Warden - device-lock and page-lock services
//!
//! This crate is the embedded security layer of the Dockeep client: the
//! idle/device lock with attempt counting, lockout, and wipe-on-failure
//! policy; independent per-page PIN/password locks with a session-scoped
//! unlock cache; and the best-effort local-data destruction routine.
//!
//! The backend record store, biometric platform API, and session provider
//! are external collaborators reached through the traits in [`store`],
//! [`biometric`], and [`session`].

pub mod biometric;
pub mod controller;
pub mod error;
pub mod idle;
pub mod page_lock;
pub mod session;
pub mod store;
pub mod timer;
pub mod wipe;

pub use biometric::{BiometricGateway, CredentialId, NullBiometricGateway};
pub use controller::{LockController, LockState, SubmitOutcome};
pub use error::{Result, ServiceError};
pub use idle::IdleSecurityService;
pub use page_lock::{PageLockService, SessionUnlockCache};
pub use session::{SessionProvider, SignOutReason, SignOutRedirect};
pub use store::{
    AttemptStore, EventSink, FileAttemptStore, MemoryAttemptStore, MemoryStore, PageLockStore,
    SettingsStore,
};
pub use timer::Countdown;
pub use wipe::{DestructionRoutine, WipeReport, WipeTarget};
