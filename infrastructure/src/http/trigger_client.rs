//! [`DialogueRunner`] that delegates each dialogue to a trigger server.
//!
//! The server owns the whole conversation loop and the persistence of its
//! pairs; this client only posts the request and reads back the report.

use super::error::HttpError;
use async_trait::async_trait;
use duet_application::ports::dialogue_runner::{
    DialogueRequest, DialogueRunner, GENERATE_CONVERSATION_PATH, TriggerReply,
};
use duet_application::retry_with_backoff;
use duet_domain::{BackoffPolicy, DialoguePhase, DialogueReport, Endpoint};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Runs dialogues by calling `POST {trigger}/generate_conversation`.
///
/// A reply whose body parses as `{message, pairs_generated}` is final, even
/// with an error status: the server may already have stored pairs, so asking
/// again would duplicate them. A request that timed out after reaching the
/// server is final for the same reason. Only connection failures, other
/// transport errors and unreadable bodies are retried.
pub struct TriggerDialogueRunner {
    client: reqwest::Client,
    trigger: Endpoint,
    policy: BackoffPolicy,
}

impl TriggerDialogueRunner {
    /// Runner whose requests give up after `request_timeout` each.
    ///
    /// A dialogue can take many model round trips, so the timeout should be
    /// far longer than a single chat call's.
    pub fn new(trigger: Endpoint, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self::with_client(client, trigger))
    }

    pub fn with_client(client: reqwest::Client, trigger: Endpoint) -> Self {
        Self {
            client,
            trigger,
            policy: BackoffPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn trigger(&self) -> &Endpoint {
        &self.trigger
    }

    async fn post_once(
        &self,
        url: &str,
        request: &DialogueRequest,
    ) -> Result<DialogueReport, HttpError> {
        match self.exchange(url, request).await {
            Err(HttpError::Transport(e)) if e.is_timeout() && !e.is_connect() => {
                warn!("POST {} timed out; the dialogue may still be running", url);
                Ok(DialogueReport::aborted(
                    DialoguePhase::Exchange,
                    format!("trigger server did not answer in time: {}", e),
                ))
            }
            other => other,
        }
    }

    async fn exchange(
        &self,
        url: &str,
        request: &DialogueRequest,
    ) -> Result<DialogueReport, HttpError> {
        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<TriggerReply>(&text) {
            Ok(reply) => {
                debug!(
                    "POST {} -> {} ({} pairs)",
                    url,
                    status.as_u16(),
                    reply.pairs_generated
                );
                Ok(reply.into_report(status == StatusCode::OK))
            }
            Err(e) if status == StatusCode::OK => Err(HttpError::Decode(e.to_string())),
            Err(_) => Err(HttpError::status(status, &text)),
        }
    }
}

#[async_trait]
impl DialogueRunner for TriggerDialogueRunner {
    async fn run(&self, request: DialogueRequest) -> DialogueReport {
        let url = self.trigger.join(GENERATE_CONVERSATION_PATH);
        let label = format!("POST {}", url);
        let url = url.as_str();
        let request = &request;

        let result =
            retry_with_backoff(&self.policy, &label, move |_| self.post_once(url, request)).await;
        match result {
            Ok(report) => report,
            Err(exhausted) => {
                warn!(
                    "Trigger {} unreachable after {} attempts",
                    self.trigger, exhausted.attempts
                );
                DialogueReport::aborted(
                    DialoguePhase::Init,
                    format!("trigger server unreachable: {}", exhausted.last_error),
                )
            }
        }
    }
}
