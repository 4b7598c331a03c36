//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application parameters on
//! demand.

mod client;
mod dialogue;
mod scheduler;
mod server;
mod storage;

pub use client::FileClientConfig;
pub use dialogue::FileDialogueConfig;
pub use scheduler::{FileSchedulerConfig, RunnerMode};
pub use server::FileServerConfig;
pub use storage::FileStorageConfig;

use super::ConfigError;
use duet_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Remote calls per dialogue besides its rounds: two starts and two seeds
const FIXED_CALLS_PER_DIALOGUE: u32 = 4;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Remote chat client retry and timeout settings
    pub client: FileClientConfig,
    /// Per-dialogue settings
    pub dialogue: FileDialogueConfig,
    /// Worker pool settings
    pub scheduler: FileSchedulerConfig,
    /// Where exchange pairs are persisted
    pub storage: FileStorageConfig,
    /// Trigger server settings
    pub server: FileServerConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Client retry policy
        if let Err(e) = self.client.backoff_policy().validate() {
            issues.push(ConfigIssue::error("client", format!("[client] {}", e)));
        }
        if self.client.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                "client.request_timeout_secs",
                "client.request_timeout_secs must be at least 1",
            ));
        }

        // 2. Scheduler
        issues.extend(self.scheduler.validate());

        // 3. Delegated dialogue timeout
        if let Some(secs) = self.scheduler.trigger_timeout_secs
            && Duration::from_secs(secs) < self.dialogue_budget()
        {
            issues.push(ConfigIssue::warning(
                "scheduler.trigger_timeout_secs",
                format!(
                    "scheduler.trigger_timeout_secs ({}) is below the worst-case dialogue time ({}s); \
                     a slow dialogue will be reported as failed while the trigger server keeps running it",
                    secs,
                    self.dialogue_budget().as_secs()
                ),
            ));
        }

        // 4. Trigger server address
        if let Err(e) = self.server.bind.parse::<SocketAddr>() {
            issues.push(ConfigIssue::error(
                "server.bind",
                format!("server.bind: '{}' is not a socket address: {}", self.server.bind, e),
            ));
        }

        issues
    }

    /// Longest one dialogue can take when every remote call uses its whole
    /// retry budget: two starts, two seeds and two sends per round.
    pub fn dialogue_budget(&self) -> Duration {
        let rounds = u32::try_from(self.dialogue.max_prompt).unwrap_or(u32::MAX);
        let calls = rounds
            .saturating_mul(2)
            .saturating_add(FIXED_CALLS_PER_DIALOGUE);
        self.client.call_budget().saturating_mul(calls)
    }

    /// Timeout for one delegated dialogue: the configured value, or the
    /// worst-case dialogue time
    pub fn trigger_timeout(&self) -> Duration {
        self.scheduler
            .trigger_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.dialogue_budget())
    }

    /// Fail on any error-level issue; hand back the remaining warnings.
    pub fn ensure_valid(&self) -> Result<Vec<ConfigIssue>, ConfigError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigError::Invalid(
                errors.into_iter().map(|issue| issue.message).collect(),
            ))
        }
    }
}
