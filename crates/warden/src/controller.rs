//! Device-lock controller state machine
//!
//! Orchestrates the user-facing unlock flow: context collection, credential
//! or biometric entry, failed-attempt counting, the lockout cooldown, and
//! the wipe countdown. States and transitions are explicit; the host UI
//! drives the machine with submissions and a once-per-second [`tick`].
//!
//! [`tick`]: LockController::tick

use std::sync::Arc;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use warden_core::{LockPolicy, SecurityEventType, SecuritySettings, UserId};

use crate::biometric::{self, BiometricGateway};
use crate::error::{Result, ServiceError};
use crate::idle::IdleSecurityService;
use crate::page_lock::SessionUnlockCache;
use crate::session::{SessionProvider, SignOutReason, SignOutRedirect};
use crate::timer::Countdown;
use crate::wipe::DestructionRoutine;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    /// Loading settings and biometric credential count
    #[default]
    CollectingContext,

    /// Credential entry (or creation), biometric optionally offered
    AwaitingInput,

    /// Lockout cooldown active, input disabled
    Locked,

    /// Irreversible wipe countdown running
    Wiping,

    /// Terminal; the flow exits
    Unlocked,
}

/// Result of a credential submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Credential accepted; the flow is done
    Unlocked,

    /// Wrong credential, attempts remain
    Retry { attempts_remaining: u32 },

    /// Threshold reached with wipe disabled; cooldown started
    LockedOut { remaining_seconds: u64 },

    /// Threshold reached with wipe enabled; countdown started
    WipeScheduled { countdown_seconds: u64 },
}

/// The device-lock unlock flow
///
/// One controller instance backs one lock-screen instance; dropping it
/// cancels the lockout countdown and the pending biometric auto-prompt. The
/// wipe countdown is deliberately not cancellable once started.
pub struct LockController {
    user: UserId,
    policy: LockPolicy,
    idle: Arc<IdleSecurityService>,
    gateway: Arc<dyn BiometricGateway>,
    session: Arc<dyn SessionProvider>,
    destruction: Arc<DestructionRoutine>,
    unlocks: Arc<SessionUnlockCache>,

    state: LockState,
    settings: SecuritySettings,
    biometric_available: bool,
    creating_credential: bool,
    input_touched: bool,
    biometric_attempted: bool,
    auto_prompt: Option<Countdown>,
    lockout: Option<Countdown>,
    wipe: Option<Countdown>,
    last_error: Option<String>,
}

impl LockController {
    /// Create a controller in `CollectingContext`
    pub fn new(
        user: UserId,
        idle: Arc<IdleSecurityService>,
        unlocks: Arc<SessionUnlockCache>,
        gateway: Arc<dyn BiometricGateway>,
        session: Arc<dyn SessionProvider>,
        destruction: Arc<DestructionRoutine>,
    ) -> Self {
        let policy = idle.policy().clone();
        Self {
            user,
            policy,
            idle,
            gateway,
            session,
            destruction,
            unlocks,
            state: LockState::CollectingContext,
            settings: SecuritySettings::default(),
            biometric_available: false,
            creating_credential: false,
            input_touched: false,
            biometric_attempted: false,
            auto_prompt: None,
            lockout: None,
            wipe: None,
            last_error: None,
        }
    }

    /// Resolve settings and biometric credentials, then await input
    ///
    /// The two fetches run concurrently; either failing is tolerated and
    /// defaults apply, so the lock screen always renders.
    pub async fn collect_context(&mut self) {
        let (settings, credentials) = tokio::join!(self.idle.get_settings(&self.user), async {
            if !self.gateway.is_supported() {
                return Vec::new();
            }
            match self.gateway.list_credentials(&self.user).await {
                Ok(credentials) => credentials,
                Err(e) => {
                    warn!("Biometric credential listing failed: {}", e);
                    Vec::new()
                }
            }
        });

        self.biometric_available = self.gateway.is_supported()
            && settings.biometric_unlock_enabled
            && !credentials.is_empty();
        self.creating_credential = settings.idle_lock_credential_hash.is_none();
        self.settings = settings;

        // A lockout window restored from local state resumes the cooldown
        let remaining = self.idle.remaining_lockout().await;
        if !remaining.is_zero() {
            self.lockout = Some(Countdown::start(remaining));
            self.state = LockState::Locked;
            return;
        }

        if self.biometric_available && !self.creating_credential {
            self.auto_prompt = Some(Countdown::start(self.policy.biometric_prompt_delay));
        }
        self.state = LockState::AwaitingInput;
    }

    /// Note that the user touched the text input
    ///
    /// Pre-empts the pending biometric auto-prompt for this screen instance.
    pub fn note_input(&mut self) {
        self.input_touched = true;
        self.auto_prompt = None;
    }

    /// Advance timers; called once per second by the host
    ///
    /// Returns a redirect when the wipe countdown completes.
    pub async fn tick(&mut self) -> Option<SignOutRedirect> {
        match self.state {
            LockState::AwaitingInput => {
                let due = self
                    .auto_prompt
                    .map_or(false, |countdown| countdown.is_expired());
                if due && !self.input_touched && !self.biometric_attempted {
                    self.auto_prompt = None;
                    self.biometric_attempted = true;
                    self.run_biometric_attempt().await;
                }
                None
            }
            LockState::Locked => {
                let expired = self.lockout.map_or(true, |countdown| countdown.is_expired());
                if expired {
                    debug!("Lockout cooldown elapsed, input re-enabled");
                    self.lockout = None;
                    self.last_error = None;
                    self.state = LockState::AwaitingInput;
                }
                None
            }
            LockState::Wiping => {
                // The countdown is consumed on expiry so further ticks after
                // the redirect never re-run the destruction
                let expired = self.wipe.map_or(false, |countdown| countdown.is_expired());
                if expired {
                    self.wipe = None;
                    let (_report, redirect) = self.destruction.execute(&self.idle).await;
                    return Some(redirect);
                }
                None
            }
            LockState::CollectingContext | LockState::Unlocked => None,
        }
    }

    /// Submit the idle-lock credential
    pub async fn submit_credential(&mut self, input: &str) -> Result<SubmitOutcome> {
        match self.state {
            LockState::AwaitingInput => {}
            LockState::Locked => {
                let remaining = self.idle.remaining_lockout_seconds().await;
                return Err(warden_core::Error::LockedOut(remaining).into());
            }
            _ => return Err(ServiceError::InvalidState("not awaiting input")),
        }
        if self.creating_credential {
            return Err(ServiceError::InvalidState("credential creation pending"));
        }

        // Typing to submit counts as interacting with the input
        self.note_input();

        if self.idle.is_locked_out().await {
            let remaining = self.idle.remaining_lockout_seconds().await;
            return Err(warden_core::Error::LockedOut(remaining).into());
        }

        let Some(stored) = self.settings.idle_lock_credential_hash else {
            return Err(ServiceError::InvalidState("no stored credential"));
        };

        let input = Zeroizing::new(input.to_string());
        if IdleSecurityService::verify_idle_credential(&input, &stored) {
            self.complete_unlock("credential").await;
            return Ok(SubmitOutcome::Unlocked);
        }

        self.register_failure().await
    }

    /// Set a new idle-lock credential when none is stored
    ///
    /// Proceeds as a successful unlock on acceptance.
    pub async fn submit_new_credential(&mut self, value: &str, confirm: &str) -> Result<SubmitOutcome> {
        if self.state != LockState::AwaitingInput || !self.creating_credential {
            return Err(ServiceError::InvalidState("not creating a credential"));
        }
        if value != confirm {
            return Err(warden_core::Error::CredentialMismatch.into());
        }

        self.idle.set_idle_lock_credential(&self.user, value).await?;
        self.settings = self.idle.get_settings(&self.user).await;
        self.creating_credential = false;

        self.complete_unlock("credential_created").await;
        Ok(SubmitOutcome::Unlocked)
    }

    /// Manually trigger the biometric prompt
    ///
    /// Returns whether the unlock succeeded; gateway errors and rejected
    /// prompts fall back to credential entry.
    pub async fn try_biometric(&mut self) -> Result<bool> {
        if self.state != LockState::AwaitingInput {
            return Err(ServiceError::InvalidState("not awaiting input"));
        }
        if self.idle.is_locked_out().await {
            let remaining = self.idle.remaining_lockout_seconds().await;
            return Err(warden_core::Error::LockedOut(remaining).into());
        }
        self.auto_prompt = None;
        self.biometric_attempted = true;
        self.run_biometric_attempt().await;
        Ok(self.state == LockState::Unlocked)
    }

    /// Sign out from the lock screen without a credential
    ///
    /// Available while awaiting input or locked out; never during the wipe
    /// countdown, which is not interruptible.
    pub async fn sign_out(&mut self) -> Result<SignOutRedirect> {
        match self.state {
            LockState::AwaitingInput | LockState::Locked => {}
            _ => return Err(ServiceError::InvalidState("cannot sign out here")),
        }

        self.idle.clear_attempt_state().await;
        self.unlocks.clear_user(&self.user).await;
        if let Err(e) = self.session.invalidate().await {
            warn!("Remote session invalidation failed during sign-out: {}", e);
        }
        self.lockout = None;
        Ok(SignOutRedirect::new(SignOutReason::UserSignOut))
    }

    async fn run_biometric_attempt(&mut self) {
        match self.gateway.authenticate().await {
            Ok(true) => {
                self.complete_unlock("biometric").await;
            }
            Ok(false) => {
                debug!("Biometric prompt rejected, falling back to credential entry");
                self.last_error = Some("Biometric authentication failed".to_string());
            }
            Err(e) => {
                warn!("Biometric authentication errored: {}", e);
                self.last_error = Some("Biometric authentication failed".to_string());
            }
        }
    }

    async fn complete_unlock(&mut self, method: &str) {
        self.idle.clear_attempt_state().await;
        self.idle
            .log_event(
                &self.user,
                SecurityEventType::UnlockSuccess,
                serde_json::json!({ "method": method }),
            )
            .await;
        self.auto_prompt = None;
        self.lockout = None;
        self.last_error = None;
        self.state = LockState::Unlocked;
        info!("Device unlocked for {} via {}", self.user, method);
    }

    async fn register_failure(&mut self) -> Result<SubmitOutcome> {
        let max = self.settings.max_unlock_attempts;
        self.idle
            .record_failed_attempt(max, self.policy.lockout_duration)
            .await;

        let attempt_state = self.idle.attempt_state().await;
        let failed = attempt_state.failed_attempts;

        self.idle
            .log_event(
                &self.user,
                SecurityEventType::UnlockFailed,
                serde_json::json!({
                    "failed_attempts": failed,
                    "max_attempts": max,
                }),
            )
            .await;

        if failed < max {
            return Ok(SubmitOutcome::Retry {
                attempts_remaining: max - failed,
            });
        }

        if self.settings.wipe_data_on_max_attempts {
            self.idle
                .log_event(
                    &self.user,
                    SecurityEventType::DeviceWipe,
                    serde_json::json!({ "failed_attempts": failed }),
                )
                .await;
            let countdown_seconds = self.policy.wipe_countdown.as_secs();
            self.wipe = Some(Countdown::start(self.policy.wipe_countdown));
            self.state = LockState::Wiping;
            info!("Attempt threshold reached, wipe countdown started");
            return Ok(SubmitOutcome::WipeScheduled { countdown_seconds });
        }

        let remaining = self.idle.remaining_lockout().await;
        let remaining_seconds = self.idle.remaining_lockout_seconds().await;
        self.idle
            .log_event(
                &self.user,
                SecurityEventType::Lockout,
                serde_json::json!({
                    "failed_attempts": failed,
                    "lockout_seconds": remaining_seconds,
                }),
            )
            .await;
        self.lockout = Some(Countdown::start(remaining));
        self.state = LockState::Locked;
        info!("Attempt threshold reached, lockout started");
        Ok(SubmitOutcome::LockedOut { remaining_seconds })
    }

    /// Current state
    pub fn state(&self) -> LockState {
        self.state
    }

    /// Settings resolved during context collection
    pub fn settings(&self) -> &SecuritySettings {
        &self.settings
    }

    /// Whether the biometric path is offered
    pub fn biometric_available(&self) -> bool {
        self.biometric_available
    }

    /// Whether the screen is collecting a new credential
    pub fn is_creating_credential(&self) -> bool {
        self.creating_credential
    }

    /// Seconds left on the lockout cooldown display
    pub fn lockout_remaining_seconds(&self) -> u64 {
        self.lockout.map_or(0, |countdown| countdown.remaining_seconds())
    }

    /// Seconds left on the wipe countdown display
    pub fn wipe_remaining_seconds(&self) -> u64 {
        self.wipe.map_or(0, |countdown| countdown.remaining_seconds())
    }

    /// Last user-visible error, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Re-check biometric availability against current settings
    pub async fn refresh_biometric_availability(&mut self) {
        self.biometric_available =
            biometric::is_available(self.gateway.as_ref(), &self.settings, &self.user).await;
    }
}
