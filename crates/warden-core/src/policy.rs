//! Lock policy configuration
//!
//! The lockout duration and wipe countdown are fixed policy values in the
//! current product, not per-user settings like `max_unlock_attempts`. They
//! are grouped here so a host can still override them wholesale (and so tests
//! can run with millisecond durations).

use std::time::Duration;

use crate::error::{Error, Result};
use crate::MIN_IDLE_CREDENTIAL_LENGTH;

/// Fixed policy values for the device-lock flow
#[derive(Clone, Debug)]
pub struct LockPolicy {
    /// Cooldown applied when the attempt threshold is hit without wipe
    pub lockout_duration: Duration,

    /// Visible countdown before the destruction routine runs
    pub wipe_countdown: Duration,

    /// Delay before the automatic biometric prompt fires, leaving room for
    /// the user's own tap or keystroke to pre-empt it
    pub biometric_prompt_delay: Duration,

    /// Minimum idle-lock credential length accepted at creation
    pub min_idle_credential_len: usize,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            lockout_duration: Duration::from_secs(15 * 60),
            wipe_countdown: Duration::from_secs(8),
            biometric_prompt_delay: Duration::from_millis(450),
            min_idle_credential_len: MIN_IDLE_CREDENTIAL_LENGTH,
        }
    }
}

impl LockPolicy {
    /// Short durations for local development and manual testing
    pub fn development() -> Self {
        Self {
            lockout_duration: Duration::from_secs(30),
            wipe_countdown: Duration::from_secs(3),
            biometric_prompt_delay: Duration::from_millis(100),
            ..Default::default()
        }
    }

    /// Validate a candidate idle-lock credential against this policy
    pub fn validate_idle_credential(&self, secret: &str) -> Result<()> {
        if secret.len() < self.min_idle_credential_len {
            return Err(Error::CredentialTooShort(self.min_idle_credential_len));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_values() {
        let policy = LockPolicy::default();
        assert_eq!(policy.lockout_duration, Duration::from_secs(900));
        assert_eq!(policy.wipe_countdown, Duration::from_secs(8));
        assert_eq!(policy.biometric_prompt_delay, Duration::from_millis(450));
    }

    #[test]
    fn test_idle_credential_validation() {
        let policy = LockPolicy::default();
        assert!(policy.validate_idle_credential("12345").is_err());
        assert!(policy.validate_idle_credential("123456").is_ok());
        assert!(policy.validate_idle_credential("a much longer phrase").is_ok());
    }
}
