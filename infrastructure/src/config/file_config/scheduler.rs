//! Worker scheduler configuration from TOML (`[scheduler]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [scheduler]
//! workers = 10
//! retry_ceiling = 5
//! success_delay_secs = 10
//! failure_delay_secs = 30
//! host = "http://localhost"
//! base_port = 8080                      # worker i talks to base_port + i
//! second_base_port = 9080               # optional distinct second participant
//! trigger_url = "http://localhost:8000"
//! trigger_timeout_secs = 7200           # unset: worst case of one dialogue
//! mode = "trigger"                      # or "in_process"
//! ```

use duet_application::SchedulerParams;
use duet_domain::{BackoffPolicy, ConfigIssue, ConfigIssueCode, DomainError, Endpoint, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Where dialogues are driven from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunnerMode {
    /// A trigger server runs each dialogue; workers only post requests
    #[default]
    Trigger,
    /// Workers talk to the chat backends directly
    InProcess,
}

impl RunnerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerMode::Trigger => "trigger",
            RunnerMode::InProcess => "in_process",
        }
    }
}

impl FromStr for RunnerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "trigger" | "server" => Ok(RunnerMode::Trigger),
            "in_process" | "local" => Ok(RunnerMode::InProcess),
            other => Err(format!("unknown runner mode '{}'", other)),
        }
    }
}

impl fmt::Display for RunnerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw scheduler configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSchedulerConfig {
    /// Number of concurrent workers
    pub workers: usize,
    /// Consecutive failed dialogues before a worker gives up
    pub retry_ceiling: u32,
    pub success_delay_secs: u64,
    pub failure_delay_secs: u64,
    pub failure_delay_cap_secs: u64,
    /// Random extra pause after every dialogue
    pub jitter_ms: u64,
    /// Scheme and host shared by every chat backend
    pub host: String,
    pub base_port: u16,
    /// Ports of the second participants; unset reuses the first endpoint
    pub second_base_port: Option<u16>,
    pub trigger_url: String,
    /// Timeout for one whole delegated dialogue. Unset derives it from the
    /// client retry budget and the round count.
    pub trigger_timeout_secs: Option<u64>,
    /// "trigger" or "in_process"
    pub mode: String,
}

impl Default for FileSchedulerConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            retry_ceiling: 5,
            success_delay_secs: 10,
            failure_delay_secs: 30,
            failure_delay_cap_secs: 30,
            jitter_ms: 500,
            host: "http://localhost".to_string(),
            base_port: 8080,
            second_base_port: None,
            trigger_url: "http://localhost:8000".to_string(),
            trigger_timeout_secs: None,
            mode: RunnerMode::default().as_str().to_string(),
        }
    }
}

impl FileSchedulerConfig {
    /// Parse mode string into RunnerMode, returning warnings on failure.
    pub fn parse_mode(&self) -> (RunnerMode, Vec<ConfigIssue>) {
        match self.mode.parse::<RunnerMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => {
                let issue = ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "scheduler.mode".to_string(),
                        value: self.mode.clone(),
                        valid_values: vec!["trigger".to_string(), "in_process".to_string()],
                    },
                    message: format!(
                        "scheduler.mode: unknown value '{}', falling back to 'trigger'",
                        self.mode
                    ),
                };
                (RunnerMode::default(), vec![issue])
            }
        }
    }

    pub fn to_params(&self) -> SchedulerParams {
        let jitter = Duration::from_millis(self.jitter_ms);
        let failure_backoff = BackoffPolicy::new(
            self.retry_ceiling,
            Duration::from_secs(self.failure_delay_secs),
        )
        .with_delay_cap(Duration::from_secs(self.failure_delay_cap_secs))
        .with_jitter(jitter);

        SchedulerParams::default()
            .with_success_delay(Duration::from_secs(self.success_delay_secs))
            .with_pacing_jitter(jitter)
            .with_failure_backoff(failure_backoff)
    }

    pub fn trigger_endpoint(&self) -> Result<Endpoint, DomainError> {
        Endpoint::try_new(self.trigger_url.as_str())
    }

    /// Endpoints of worker `index`: first participant and optional second one
    pub fn worker_endpoints(
        &self,
        index: usize,
    ) -> Result<(Endpoint, Option<Endpoint>), DomainError> {
        let first = Endpoint::with_port_offset(&self.host, self.base_port, index)?;
        let second = self
            .second_base_port
            .map(|port| Endpoint::with_port_offset(&self.host, port, index))
            .transpose()?;
        Ok((first, second))
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.workers == 0 {
            issues.push(ConfigIssue::error(
                "scheduler.workers",
                "scheduler.workers must be at least 1",
            ));
        }
        if self.retry_ceiling == 0 {
            issues.push(ConfigIssue::error(
                "scheduler.retry_ceiling",
                "scheduler.retry_ceiling must be at least 1",
            ));
        }
        if self.failure_delay_cap_secs < self.failure_delay_secs {
            issues.push(ConfigIssue::error(
                "scheduler.failure_delay_cap_secs",
                format!(
                    "scheduler.failure_delay_cap_secs ({}) is below failure_delay_secs ({})",
                    self.failure_delay_cap_secs, self.failure_delay_secs
                ),
            ));
        }
        if let Err(e) = self.trigger_endpoint() {
            issues.push(ConfigIssue::error(
                "scheduler.trigger_url",
                format!("scheduler.trigger_url: {}", e),
            ));
        }
        if self.workers > 0
            && let Err(e) = self.worker_endpoints(self.workers - 1)
        {
            issues.push(ConfigIssue::error(
                "scheduler.host",
                format!("scheduler endpoints for {} workers: {}", self.workers, e),
            ));
        }
        issues.extend(self.parse_mode().1);

        issues
    }
}
