//! Cancellable countdown timers
//!
//! The lockout cooldown and the wipe countdown are both modelled as a
//! [`Countdown`] sampled once per second by the controller's tick. A
//! countdown is cancelled by dropping it with its owning state; each is the
//! only mutator of its displayed remaining time.

use std::time::{Duration, Instant};

/// A deadline sampled by the owning state's tick
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    deadline: Instant,
}

impl Countdown {
    /// Start a countdown lasting `duration` from now
    pub fn start(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
        }
    }

    /// Time left, zero once expired
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whole seconds left for display, rounded up so the countdown never
    /// shows 0 while time remains
    pub fn remaining_seconds(&self) -> u64 {
        let remaining = self.remaining();
        if remaining.is_zero() {
            0
        } else {
            u64::from(remaining.subsec_nanos() > 0) + remaining.as_secs()
        }
    }

    /// Whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_countdown_expires() {
        let countdown = Countdown::start(Duration::from_millis(30));
        assert!(!countdown.is_expired());
        sleep(Duration::from_millis(40));
        assert!(countdown.is_expired());
        assert_eq!(countdown.remaining_seconds(), 0);
    }

    #[test]
    fn test_remaining_seconds_rounds_up() {
        let countdown = Countdown::start(Duration::from_millis(1500));
        // 1.5s remaining displays as 2
        assert_eq!(countdown.remaining_seconds(), 2);
    }

    #[test]
    fn test_remaining_never_negative() {
        let countdown = Countdown::start(Duration::from_millis(1));
        sleep(Duration::from_millis(10));
        assert_eq!(countdown.remaining(), Duration::ZERO);
    }
}
