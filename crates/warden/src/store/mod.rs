//! Storage abstraction over the external record store
//!
//! The backing persistence engine is an external collaborator; these traits
//! describe the record shapes this subsystem reads and writes. `MemoryStore`
//! backs tests and single-process hosts; `FileAttemptStore` persists the
//! client-local attempt state across app restarts.

mod file;
mod memory;

pub use file::FileAttemptStore;
pub use memory::{MemoryAttemptStore, MemoryStore};

use async_trait::async_trait;

use warden_core::{AttemptState, Page, PageLockRecord, SecurityEvent, SecuritySettings, UserId};

use crate::error::Result;

/// Access to `security_settings` records (one per user)
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load settings for a user, `None` if never created
    async fn load(&self, user: &UserId) -> Result<Option<SecuritySettings>>;

    /// Create or replace settings for a user
    async fn save(&self, user: &UserId, settings: &SecuritySettings) -> Result<()>;
}

/// Access to `page_locks` records (unique per user and page)
#[async_trait]
pub trait PageLockStore: Send + Sync {
    /// Load the lock record for a page, `None` if no lock is configured
    async fn load(&self, user: &UserId, page: Page) -> Result<Option<PageLockRecord>>;

    /// Create or replace the lock record for a page
    async fn upsert(&self, user: &UserId, page: Page, record: PageLockRecord) -> Result<()>;

    /// Delete the lock record for a page
    async fn remove(&self, user: &UserId, page: Page) -> Result<()>;
}

/// Append-only sink for `security_event_log` records
///
/// Events are never read back by this subsystem.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Append one audit event
    async fn append(&self, event: SecurityEvent) -> Result<()>;
}

/// Client-local storage for the device-lock attempt state
///
/// This state is never server-persisted; it lives in the client's own
/// ephemeral or local store and is destroyed by the wipe routine.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Load the current attempt state, defaulting when absent
    async fn load(&self) -> Result<AttemptState>;

    /// Persist the attempt state
    async fn save(&self, state: &AttemptState) -> Result<()>;

    /// Remove the attempt state entirely
    async fn clear(&self) -> Result<()>;
}
