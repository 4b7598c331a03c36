//! Dialogue runner port
//!
//! A runner takes one trigger request and drives a dialogue to a terminal
//! report. The scheduler does not care whether that happens in this process
//! or behind a trigger server.

use async_trait::async_trait;
use duet_domain::{ChatSetting, DialogueOutcome, DialogueReport, Endpoint, ServerId};
use serde::{Deserialize, Serialize};

/// Route a trigger server exposes for running one dialogue
pub const GENERATE_CONVERSATION_PATH: &str = "generate_conversation";

/// Trigger input: which participants to connect and what to talk about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueRequest {
    pub server_url: Endpoint,
    /// Second participant; the first endpoint is reused when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url_2: Option<Endpoint>,
    pub initial_message: String,
    pub topic: String,
    pub max_prompt: usize,
    /// Forwarded to both participants as `serverId`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<ServerId>,
}

impl DialogueRequest {
    pub fn new(server_url: Endpoint, setting: &ChatSetting, max_prompt: usize) -> Self {
        Self {
            server_url,
            server_url_2: None,
            initial_message: setting.initial_message.clone(),
            topic: setting.topic.clone(),
            max_prompt,
            server_id: None,
        }
    }

    pub fn with_second_participant(mut self, endpoint: Endpoint) -> Self {
        self.server_url_2 = Some(endpoint);
        self
    }

    pub fn with_server_id(mut self, server_id: ServerId) -> Self {
        self.server_id = Some(server_id);
        self
    }

    pub fn second_endpoint(&self) -> &Endpoint {
        self.server_url_2.as_ref().unwrap_or(&self.server_url)
    }

    pub fn setting(&self) -> ChatSetting {
        ChatSetting::new(self.topic.clone(), self.initial_message.clone())
    }
}

/// Trigger output: `{message, pairs_generated}` plus the terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerReply {
    pub message: String,
    pub pairs_generated: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DialogueOutcome>,
}

impl TriggerReply {
    /// Rebuild a report from a reply, using the HTTP status when the server
    /// did not say which terminal state it reached.
    pub fn into_report(self, status_ok: bool) -> DialogueReport {
        let outcome = self.outcome.unwrap_or(match (status_ok, self.pairs_generated) {
            (true, _) => DialogueOutcome::Completed,
            (false, 0) => DialogueOutcome::Aborted,
            (false, _) => DialogueOutcome::StoppedEarly,
        });
        DialogueReport {
            outcome,
            pairs_generated: self.pairs_generated,
            message: self.message,
        }
    }
}

impl From<&DialogueReport> for TriggerReply {
    fn from(report: &DialogueReport) -> Self {
        Self {
            message: report.message.clone(),
            pairs_generated: report.pairs_generated,
            outcome: Some(report.outcome),
        }
    }
}

/// Runs one dialogue to its terminal report. Never fails outright.
#[async_trait]
pub trait DialogueRunner: Send + Sync {
    async fn run(&self, request: DialogueRequest) -> DialogueReport;
}
