//! Persisted record shapes and client-local attempt state

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CredentialHash, LockType, UserId};
use crate::DEFAULT_MAX_UNLOCK_ATTEMPTS;

/// Device-wide lock settings, one record per user
///
/// Created lazily on first access. Never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Hash of the idle-lock credential; absent until the user sets one
    pub idle_lock_credential_hash: Option<CredentialHash>,

    /// Whether a platform biometric credential may unlock the device
    pub biometric_unlock_enabled: bool,

    /// Failed attempts tolerated before lockout or wipe (>= 1)
    pub max_unlock_attempts: u32,

    /// Destroy all local data instead of locking out at the threshold
    pub wipe_data_on_max_attempts: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            idle_lock_credential_hash: None,
            biometric_unlock_enabled: false,
            max_unlock_attempts: DEFAULT_MAX_UNLOCK_ATTEMPTS,
            wipe_data_on_max_attempts: false,
        }
    }
}

/// Client-local failed-attempt tracking, never server-persisted
///
/// The step that pushes `failed_attempts` to the threshold is exactly the
/// step that sets `lockout_until`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptState {
    /// Consecutive failed unlock attempts
    pub failed_attempts: u32,

    /// Unix timestamp (milliseconds) until which attempts are rejected
    pub lockout_until: Option<u64>,
}

impl AttemptState {
    /// Record one failed attempt; starts a lockout window when the new count
    /// reaches `max_attempts`
    pub fn record_failure(&mut self, max_attempts: u32, lockout: Duration, now_ms: u64) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        if self.failed_attempts >= max_attempts {
            self.lockout_until = Some(now_ms + lockout.as_millis() as u64);
        }
    }

    /// Reset after any successful unlock
    pub fn clear(&mut self) {
        self.failed_attempts = 0;
        self.lockout_until = None;
    }

    /// Whether a lockout window is active at the given time
    pub fn is_locked_out(&self, now_ms: u64) -> bool {
        self.lockout_until.map_or(false, |until| now_ms < until)
    }

    /// Time left in the lockout window (zero when not locked out)
    pub fn remaining_lockout(&self, now_ms: u64) -> Duration {
        Duration::from_millis(
            self.lockout_until
                .map_or(0, |until| until.saturating_sub(now_ms)),
        )
    }

    /// Whole seconds left for display, rounded up so an active window never
    /// shows 0
    pub fn remaining_lockout_seconds(&self, now_ms: u64) -> u64 {
        let remaining = self.remaining_lockout(now_ms);
        if remaining.is_zero() {
            0
        } else {
            remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
        }
    }
}

/// Per-section lock record, unique per (user, page)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLockRecord {
    /// PIN or password
    pub lock_type: LockType,

    /// Hash of the lock secret
    pub lock_value_hash: CredentialHash,

    /// Whether the lock currently applies
    pub is_enabled: bool,

    /// When the record was first created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

impl PageLockRecord {
    /// Create a fresh record
    pub fn new(lock_type: LockType, lock_value_hash: CredentialHash, is_enabled: bool) -> Self {
        let now = Utc::now();
        Self {
            lock_type,
            lock_value_hash,
            is_enabled,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Audit event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    UnlockSuccess,
    UnlockFailed,
    Lockout,
    DeviceWipe,
}

/// Append-only audit record, written and never read back by this subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub user_id: UserId,
    pub event_type: SecurityEventType,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl SecurityEvent {
    /// Create an event stamped with the current time
    pub fn new(user_id: UserId, event_type: SecurityEventType, details: serde_json::Value) -> Self {
        Self {
            user_id,
            event_type,
            details,
            created_at: Utc::now(),
        }
    }
}
