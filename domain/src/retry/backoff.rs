//! Bounded exponential backoff policy.
//!
//! One policy type drives every retry decision in the system: the remote chat
//! client's per-call attempts, the trigger client, and a worker's pause after
//! a failed dialogue. The policy only computes; sleeping is left to callers.

use crate::core::error::DomainError;
use rand::Rng;
use std::time::Duration;

/// Retry budget and delay curve.
///
/// The delay before retry `n` (0-indexed) is `min(base_delay * 2^n, delay_cap)`
/// plus a uniform sample in `[0, jitter]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Total attempts allowed, including the first one (at least 1)
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub delay_cap: Duration,
    pub jitter: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            delay_cap: Duration::from_secs(30),
            jitter: Duration::ZERO,
        }
    }
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// Constant delay between attempts (`delay_cap == base_delay`)
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            delay_cap: delay,
            jitter: Duration::ZERO,
        }
    }

    /// No delay at all; useful for tests and tight loops.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::fixed(max_attempts, Duration::ZERO)
    }

    // ==================== Builder Methods ====================

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delay_cap(mut self, cap: Duration) -> Self {
        self.delay_cap = cap;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    // ==================== Queries ====================

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_attempts == 0 {
            return Err(DomainError::InvalidBackoff(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.delay_cap < self.base_delay {
            return Err(DomainError::InvalidBackoff(format!(
                "delay cap {:?} is below base delay {:?}",
                self.delay_cap, self.base_delay
            )));
        }
        Ok(())
    }

    /// True once `attempts_made` has used up the budget.
    pub fn is_exhausted(&self, attempts_made: u32) -> bool {
        attempts_made >= self.max_attempts
    }

    /// Deterministic part of the delay before retry `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(Duration::MAX)
            .min(self.delay_cap)
    }

    /// Delay before retry `attempt` with a jitter sample drawn from `rng`.
    pub fn jittered_delay<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        self.delay_for(attempt).saturating_add(self.sample_jitter(rng))
    }

    /// A uniform sample in `[0, jitter]`
    pub fn sample_jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let max_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.gen_range(0..=max_ms))
    }
}
