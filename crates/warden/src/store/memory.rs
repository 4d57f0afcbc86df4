//! In-memory store implementations
//!
//! Back unit and scenario tests, and serve as the record cache for hosts
//! that proxy writes to the managed backend elsewhere.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use warden_core::{AttemptState, Page, PageLockRecord, SecurityEvent, SecuritySettings, UserId};

use crate::error::Result;
use crate::store::{AttemptStore, EventSink, PageLockStore, SettingsStore};

/// In-memory implementation of all backend record stores
#[derive(Default)]
pub struct MemoryStore {
    settings: Mutex<HashMap<UserId, SecuritySettings>>,
    page_locks: Mutex<HashMap<(UserId, Page), PageLockRecord>>,
    events: Mutex<Vec<SecurityEvent>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every logged event (test inspection)
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().expect("event log poisoned").clone()
    }

    /// Number of page-lock records currently held
    pub fn page_lock_count(&self) -> usize {
        self.page_locks.lock().expect("page locks poisoned").len()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load(&self, user: &UserId) -> Result<Option<SecuritySettings>> {
        Ok(self
            .settings
            .lock()
            .expect("settings poisoned")
            .get(user)
            .cloned())
    }

    async fn save(&self, user: &UserId, settings: &SecuritySettings) -> Result<()> {
        self.settings
            .lock()
            .expect("settings poisoned")
            .insert(user.clone(), settings.clone());
        Ok(())
    }
}

#[async_trait]
impl PageLockStore for MemoryStore {
    async fn load(&self, user: &UserId, page: Page) -> Result<Option<PageLockRecord>> {
        Ok(self
            .page_locks
            .lock()
            .expect("page locks poisoned")
            .get(&(user.clone(), page))
            .cloned())
    }

    async fn upsert(&self, user: &UserId, page: Page, record: PageLockRecord) -> Result<()> {
        self.page_locks
            .lock()
            .expect("page locks poisoned")
            .insert((user.clone(), page), record);
        Ok(())
    }

    async fn remove(&self, user: &UserId, page: Page) -> Result<()> {
        self.page_locks
            .lock()
            .expect("page locks poisoned")
            .remove(&(user.clone(), page));
        Ok(())
    }
}

#[async_trait]
impl EventSink for MemoryStore {
    async fn append(&self, event: SecurityEvent) -> Result<()> {
        self.events.lock().expect("event log poisoned").push(event);
        Ok(())
    }
}

/// In-memory attempt state, lost on process exit
#[derive(Default)]
pub struct MemoryAttemptStore {
    state: Mutex<Option<AttemptState>>,
}

impl MemoryAttemptStore {
    /// Create an empty attempt store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn load(&self) -> Result<AttemptState> {
        Ok(self
            .state
            .lock()
            .expect("attempt state poisoned")
            .unwrap_or_default())
    }

    async fn save(&self, state: &AttemptState) -> Result<()> {
        *self.state.lock().expect("attempt state poisoned") = Some(*state);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.state.lock().expect("attempt state poisoned") = None;
        Ok(())
    }
}
