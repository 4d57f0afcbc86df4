//! Idle security service
//!
//! Owns the device-lock settings, the client-local attempt counter with its
//! lockout window, and the audit sink. Verification itself is pure; the
//! caller decides what a verdict does to the counters.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use warden_core::{
    hash_credential, verify_credential, AttemptState, CredentialHash, LockPolicy, SecurityEvent,
    SecurityEventType, SecuritySettings, UserId,
};

use crate::error::Result;
use crate::store::{AttemptStore, EventSink, SettingsStore};

/// Device-wide lock settings, attempt counters, and audit logging
pub struct IdleSecurityService {
    settings: Arc<dyn SettingsStore>,
    attempts: Arc<dyn AttemptStore>,
    events: Arc<dyn EventSink>,
    policy: LockPolicy,
}

impl IdleSecurityService {
    /// Create the service over the given stores
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        attempts: Arc<dyn AttemptStore>,
        events: Arc<dyn EventSink>,
        policy: LockPolicy,
    ) -> Self {
        Self {
            settings,
            attempts,
            events,
            policy,
        }
    }

    /// The policy this service was configured with
    pub fn policy(&self) -> &LockPolicy {
        &self.policy
    }

    /// Fetch settings, creating defaults on first access
    ///
    /// Fails soft: a read error yields defaults with no stored credential,
    /// which forces credential creation rather than crashing the lock screen.
    pub async fn get_settings(&self, user: &UserId) -> SecuritySettings {
        match self.settings.load(user).await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                let settings = SecuritySettings::default();
                if let Err(e) = self.settings.save(user, &settings).await {
                    warn!("Failed to create default security settings: {}", e);
                }
                settings
            }
            Err(e) => {
                warn!("Failed to load security settings, using defaults: {}", e);
                SecuritySettings::default()
            }
        }
    }

    /// Persist updated settings
    pub async fn save_settings(&self, user: &UserId, settings: &SecuritySettings) -> Result<()> {
        self.settings.save(user, settings).await
    }

    /// Set or replace the idle-lock credential
    ///
    /// Validates against the policy minimum, stores the hash, and clears any
    /// existing attempt state.
    pub async fn set_idle_lock_credential(&self, user: &UserId, secret: &str) -> Result<()> {
        self.policy.validate_idle_credential(secret)?;

        let secret = Zeroizing::new(secret.to_string());
        let hash = hash_credential(&secret);

        let mut settings = self.get_settings(user).await;
        settings.idle_lock_credential_hash = Some(hash);
        self.settings.save(user, &settings).await?;

        self.clear_attempt_state().await;
        debug!("Idle-lock credential updated for {}", user);
        Ok(())
    }

    /// Verify a credential against a stored hash
    ///
    /// Pure comparison; no side effects on attempt counters.
    pub fn verify_idle_credential(secret: &str, stored: &CredentialHash) -> bool {
        verify_credential(secret, stored)
    }

    /// Record one failed attempt, starting the lockout window at the
    /// threshold
    ///
    /// Persistence is best-effort; the caller re-reads [`attempt_state`]
    /// to learn whether the threshold was hit.
    ///
    /// [`attempt_state`]: IdleSecurityService::attempt_state
    pub async fn record_failed_attempt(&self, max_attempts: u32, lockout: Duration) {
        let mut state = self.attempt_state().await;
        state.record_failure(max_attempts, lockout, unix_now_ms());
        if let Err(e) = self.attempts.save(&state).await {
            warn!("Failed to persist attempt state: {}", e);
        }
    }

    /// Current attempt state (defaults when unreadable)
    pub async fn attempt_state(&self) -> AttemptState {
        match self.attempts.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to load attempt state, using defaults: {}", e);
                AttemptState::default()
            }
        }
    }

    /// Whether a lockout window is active
    pub async fn is_locked_out(&self) -> bool {
        self.attempt_state().await.is_locked_out(unix_now_ms())
    }

    /// Time left in the active lockout window (zero when none)
    pub async fn remaining_lockout(&self) -> Duration {
        self.attempt_state().await.remaining_lockout(unix_now_ms())
    }

    /// Seconds left in the active lockout window for display (0 when none)
    pub async fn remaining_lockout_seconds(&self) -> u64 {
        self.attempt_state()
            .await
            .remaining_lockout_seconds(unix_now_ms())
    }

    /// Reset the counter and lockout window
    ///
    /// Called on any successful unlock and as the first step of the wipe.
    pub async fn clear_attempt_state(&self) {
        if let Err(e) = self.attempts.clear().await {
            warn!("Failed to clear attempt state: {}", e);
        }
    }

    /// Fire-and-forget append to the audit sink
    ///
    /// A sink failure never blocks the unlock flow.
    pub async fn log_event(
        &self,
        user: &UserId,
        event_type: SecurityEventType,
        details: serde_json::Value,
    ) {
        let event = SecurityEvent::new(user.clone(), event_type, details);
        if let Err(e) = self.events.append(event).await {
            warn!("Failed to append security event: {}", e);
        }
    }
}

/// Current Unix time in milliseconds
fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
