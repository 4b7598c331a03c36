//! Chat client configuration from TOML (`[client]` section)

use duet_domain::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw chat client configuration from TOML
///
/// # Example
///
/// ```toml
/// [client]
/// max_attempts = 5          # attempts per start/send call
/// base_delay_ms = 1000      # first retry delay, doubled per attempt
/// delay_cap_ms = 30000      # upper bound for a single retry delay
/// jitter_ms = 0             # random extra delay per retry
/// request_timeout_secs = 120
/// teardown_path = "end"     # optional session teardown route
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClientConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub delay_cap_ms: u64,
    pub jitter_ms: u64,
    pub request_timeout_secs: u64,
    /// Route for releasing a session; unset means sessions expire on their own
    pub teardown_path: Option<String>,
}

impl Default for FileClientConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            delay_cap_ms: 30_000,
            jitter_ms: 0,
            request_timeout_secs: 120,
            teardown_path: None,
        }
    }
}

impl FileClientConfig {
    /// Retry policy for every remote call
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
            .with_delay_cap(Duration::from_millis(self.delay_cap_ms))
            .with_jitter(Duration::from_millis(self.jitter_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Longest one remote call can take: every attempt timing out plus the
    /// retry delays (with full jitter) between them.
    pub fn call_budget(&self) -> Duration {
        let policy = self.backoff_policy();
        let attempts = policy.max_attempts.max(1);
        (0..attempts - 1).fold(
            self.request_timeout().saturating_mul(attempts),
            |budget, attempt| {
                budget
                    .saturating_add(policy.delay_for(attempt))
                    .saturating_add(policy.jitter)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_deserialize() {
        let toml_str = r#"
[client]
max_attempts = 3
base_delay_ms = 200
delay_cap_ms = 1000
teardown_path = "end"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let policy = config.client.backoff_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for(5), Duration::from_millis(1000));
        assert_eq!(config.client.teardown_path.as_deref(), Some("end"));
        assert_eq!(config.client.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_call_budget_counts_timeouts_and_delays() {
        // 5 x 120 s timeouts + 1 + 2 + 4 + 8 s of retry delays
        let config = FileClientConfig::default();
        assert_eq!(config.call_budget(), Duration::from_secs(615));

        let single = FileClientConfig {
            max_attempts: 1,
            jitter_ms: 250,
            ..Default::default()
        };
        assert_eq!(single.call_budget(), Duration::from_secs(120));
    }
}
