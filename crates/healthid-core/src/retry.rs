//! Bounded, user-initiated OTP resend policy.
//!
//! The engine never retries a failed provider call on its own; the only
//! retry affordance is the explicit resend action, and it is counted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::FlowError;

/// Per-flow resend policy. `cooldown` is the client-side throttle between
/// resends (a UX concern, not enforced by the engine itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpRetryPolicy {
    pub max_resends: u32,
    pub cooldown: Duration,
}

impl OtpRetryPolicy {
    pub fn new(max_resends: u32, cooldown: Duration) -> Self {
        Self {
            max_resends,
            cooldown,
        }
    }
}

impl Default for OtpRetryPolicy {
    fn default() -> Self {
        Self {
            max_resends: 3,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Resend counter carried in the flow memory of every OTP-bearing flow.
/// Starts at 0 and only moves forward until the flow resets it after a
/// successful verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryCounter {
    count: u32,
}

impl RetryCounter {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn can_resend(&self, policy: &OtpRetryPolicy) -> bool {
        self.count < policy.max_resends
    }

    /// Gate checked *before* the provider call: once the bound is reached
    /// no further resend is permitted until the flow restarts.
    pub fn check(&self, policy: &OtpRetryPolicy) -> Result<(), FlowError> {
        if self.can_resend(policy) {
            Ok(())
        } else {
            Err(FlowError::RetryExhausted)
        }
    }

    pub fn record(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Disables the resend affordance outright (used when a resend call
    /// itself fails on the provider side).
    pub fn exhaust(&mut self) {
        self.count = u32::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resend_bound_is_enforced_before_the_call() {
        let policy = OtpRetryPolicy::new(2, Duration::from_secs(60));
        let mut counter = RetryCounter::default();

        assert!(counter.check(&policy).is_ok());
        counter.record();
        assert!(counter.check(&policy).is_ok());
        counter.record();
        assert_eq!(counter.check(&policy), Err(FlowError::RetryExhausted));
    }

    #[test]
    fn reset_reopens_the_affordance() {
        let policy = OtpRetryPolicy::new(1, Duration::from_secs(60));
        let mut counter = RetryCounter::default();
        counter.record();
        assert!(!counter.can_resend(&policy));
        counter.reset();
        assert!(counter.can_resend(&policy));
    }

    #[test]
    fn exhaust_saturates() {
        let policy = OtpRetryPolicy::default();
        let mut counter = RetryCounter::default();
        counter.exhaust();
        counter.record();
        assert!(!counter.can_resend(&policy));
    }
}
