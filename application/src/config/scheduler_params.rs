//! Scheduler parameters: worker pacing and failure handling.
//!
//! [`SchedulerParams`] groups the static parameters of the worker loop in
//! [`RunWorkersUseCase`](crate::use_cases::run_workers::RunWorkersUseCase).

use duet_domain::BackoffPolicy;
use std::time::Duration;

/// Worker loop control parameters.
///
/// The failure backoff doubles as the retry ceiling: a worker gives up once
/// `failure_backoff.max_attempts` dialogues in a row have failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerParams {
    /// Pause after a successful dialogue.
    pub success_delay: Duration,
    /// Random extra pause added after a success, in `[0, pacing_jitter]`.
    pub pacing_jitter: Duration,
    /// Pause curve and retry ceiling after failed dialogues.
    pub failure_backoff: BackoffPolicy,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            success_delay: Duration::from_secs(10),
            pacing_jitter: Duration::from_millis(500),
            failure_backoff: BackoffPolicy::fixed(5, Duration::from_secs(30))
                .with_jitter(Duration::from_millis(500)),
        }
    }
}

impl SchedulerParams {
    /// Parameters without any pauses, keeping the given retry ceiling
    pub fn immediate(retry_ceiling: u32) -> Self {
        Self {
            success_delay: Duration::ZERO,
            pacing_jitter: Duration::ZERO,
            failure_backoff: BackoffPolicy::immediate(retry_ceiling),
        }
    }

    /// Pause after a success as a single-step policy: `success_delay` plus jitter
    pub fn success_pacing(&self) -> BackoffPolicy {
        BackoffPolicy::fixed(1, self.success_delay).with_jitter(self.pacing_jitter)
    }

    pub fn retry_ceiling(&self) -> u32 {
        self.failure_backoff.max_attempts
    }

    // ==================== Builder Methods ====================

    pub fn with_success_delay(mut self, delay: Duration) -> Self {
        self.success_delay = delay;
        self
    }

    pub fn with_pacing_jitter(mut self, jitter: Duration) -> Self {
        self.pacing_jitter = jitter;
        self
    }

    pub fn with_failure_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.failure_backoff = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pacing_contract() {
        let params = SchedulerParams::default();
        assert_eq!(params.success_delay, Duration::from_secs(10));
        assert_eq!(params.failure_backoff.delay_for(0), Duration::from_secs(30));
        assert_eq!(params.failure_backoff.delay_for(4), Duration::from_secs(30));
        assert_eq!(params.retry_ceiling(), 5);
    }

    #[test]
    fn test_immediate_has_no_pauses() {
        let params = SchedulerParams::immediate(3);
        assert_eq!(params.retry_ceiling(), 3);
        assert_eq!(params.success_delay, Duration::ZERO);
        assert_eq!(params.failure_backoff.delay_for(2), Duration::ZERO);
        assert_eq!(params.success_pacing().delay_for(0), Duration::ZERO);
    }

    #[test]
    fn test_success_pacing_stays_within_jitter() {
        let params = SchedulerParams::default();
        let pacing = params.success_pacing();
        assert_eq!(pacing.delay_for(0), Duration::from_secs(10));

        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let pause = pacing.jittered_delay(0, &mut rng);
            assert!(pause >= Duration::from_secs(10));
            assert!(pause <= Duration::from_millis(10_500));
        }
    }
}
