//! Run Dialogue use case
//!
//! Drives one two-party conversation from session start to a terminal report:
//!
//! 1. **Init**: open a session on each participant
//! 2. **Seed**: send the opening prompt to A and the opening cue to B
//! 3. **Exchange**: forward B's latest reply to A, then A's reply to B, and
//!    record the pair; repeated `max_prompt` times
//!
//! Init or Seed failures abort the dialogue. An Exchange failure stops it,
//! keeping every round completed so far. Neither is raised as an error.

use crate::config::DialogueParams;
use crate::ports::chat_backend::{ChatBackend, ChatBackendFactory, RemoteError};
use crate::ports::conversation_store::{ConversationStore, NoConversationStore};
use crate::ports::dialogue_runner::{DialogueRequest, DialogueRunner};
use async_trait::async_trait;
use duet_domain::{
    ChatId, ChatSetting, DialoguePhase, DialogueReport, ExchangePair, PromptTemplate, ServerId,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Input for the RunDialogue use case
#[derive(Debug, Clone)]
pub struct RunDialogueInput {
    pub setting: ChatSetting,
    pub params: DialogueParams,
    pub server_id: Option<ServerId>,
}

impl RunDialogueInput {
    pub fn new(setting: ChatSetting, params: DialogueParams) -> Self {
        Self {
            setting,
            params,
            server_id: None,
        }
    }

    pub fn with_server_id(mut self, server_id: ServerId) -> Self {
        self.server_id = Some(server_id);
        self
    }
}

/// Use case for running a single dialogue between two participants
pub struct RunDialogueUseCase {
    first: Arc<dyn ChatBackend>,
    second: Arc<dyn ChatBackend>,
    store: Arc<dyn ConversationStore>,
}

impl RunDialogueUseCase {
    pub fn new(first: Arc<dyn ChatBackend>, second: Arc<dyn ChatBackend>) -> Self {
        Self {
            first,
            second,
            store: Arc::new(NoConversationStore),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = store;
        self
    }

    /// Execute the dialogue. Always returns a terminal report.
    pub async fn execute(&self, input: RunDialogueInput) -> DialogueReport {
        let server_id = input.server_id.as_ref();

        info!(
            "Starting dialogue on '{}' between {} and {}",
            input.setting.topic,
            self.first.endpoint(),
            self.second.endpoint()
        );

        // Init: sessions are independent, so both can be opened at once
        let (first_start, second_start) =
            tokio::join!(self.first.start(server_id), self.second.start(server_id));

        let (first_chat, second_chat) = match (first_start, second_start) {
            (Ok(a), Ok(b)) => (a, b),
            (Ok(a), Err(e)) => {
                self.finish(&input, Some(&a), None).await;
                return Self::abort(DialoguePhase::Init, e);
            }
            (Err(e), Ok(b)) => {
                self.finish(&input, None, Some(&b)).await;
                return Self::abort(DialoguePhase::Init, e);
            }
            (Err(e), Err(_)) => return Self::abort(DialoguePhase::Init, e),
        };
        debug!("Sessions opened: {} / {}", first_chat, second_chat);

        let report = self.converse(&input, &first_chat, &second_chat).await;
        self.finish(&input, Some(&first_chat), Some(&second_chat)).await;

        info!(
            "Dialogue on '{}' ended {} with {} pairs",
            input.setting.topic, report.outcome, report.pairs_generated
        );
        report
    }

    /// Seed and Exchange phases
    async fn converse(
        &self,
        input: &RunDialogueInput,
        first_chat: &ChatId,
        second_chat: &ChatId,
    ) -> DialogueReport {
        let server_id = input.server_id.as_ref();
        let topic = input.setting.topic.as_str();

        // Seed: A's answer to the opening prompt is not forwarded; B opens
        let seed = PromptTemplate::seed_prompt(&input.setting);
        if let Err(e) = self.first.send(first_chat, &seed, server_id).await {
            return Self::abort(DialoguePhase::Seed, e);
        }
        let mut second_reply = match self
            .second
            .send(second_chat, PromptTemplate::opening_cue(), server_id)
            .await
        {
            Ok(reply) => reply,
            Err(e) => return Self::abort(DialoguePhase::Seed, e),
        };

        // Exchange
        let mut pairs = 0;
        for round in 0..input.params.max_prompt {
            let prompt = Self::forwardable(second_reply, round, topic);
            let first_reply = match self.first.send(first_chat, &prompt, server_id).await {
                Ok(reply) => reply,
                Err(e) => return Self::stop(pairs, e),
            };

            let prompt = Self::forwardable(first_reply.clone(), round, topic);
            second_reply = match self.second.send(second_chat, &prompt, server_id).await {
                Ok(reply) => reply,
                Err(e) => return Self::stop(pairs, e),
            };

            let pair = ExchangePair::new(first_reply, second_reply.clone());
            if let Err(e) = self.store.append(&pair).await {
                warn!("Failed to store exchange pair {}: {}", pairs + 1, e);
            }
            pairs += 1;
            debug!("Round {}/{} complete", round + 1, input.params.max_prompt);
        }

        DialogueReport::completed(pairs)
    }

    /// A reply to forward as the next prompt; blank replies become a follow-up
    fn forwardable(reply: String, round: usize, topic: &str) -> String {
        if reply.trim().is_empty() {
            debug!("Blank reply in round {}, sending a follow-up instead", round + 1);
            PromptTemplate::follow_up_for_round(round, topic)
        } else {
            reply
        }
    }

    fn abort(phase: DialoguePhase, error: RemoteError) -> DialogueReport {
        warn!("Dialogue aborted during {}: {}", phase, error);
        DialogueReport::aborted(phase, error)
    }

    fn stop(pairs: usize, error: RemoteError) -> DialogueReport {
        warn!("Dialogue stopped after {} pairs: {}", pairs, error);
        DialogueReport::stopped_early(pairs, error)
    }

    /// Release sessions when teardown is enabled; failures are only logged
    async fn finish(
        &self,
        input: &RunDialogueInput,
        first_chat: Option<&ChatId>,
        second_chat: Option<&ChatId>,
    ) {
        if !input.params.end_sessions {
            return;
        }
        let server_id = input.server_id.as_ref();
        for (backend, chat) in [(&self.first, first_chat), (&self.second, second_chat)] {
            if let Some(chat) = chat
                && let Err(e) = backend.end_session(chat, server_id).await
            {
                debug!("Could not end session {}: {}", chat, e);
            }
        }
    }
}

/// Runs trigger requests in this process.
pub struct LocalDialogueRunner {
    factory: Arc<dyn ChatBackendFactory>,
    store: Arc<dyn ConversationStore>,
    end_sessions: bool,
}

impl LocalDialogueRunner {
    pub fn new(factory: Arc<dyn ChatBackendFactory>) -> Self {
        Self {
            factory,
            store: Arc::new(NoConversationStore),
            end_sessions: false,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_end_sessions(mut self, end_sessions: bool) -> Self {
        self.end_sessions = end_sessions;
        self
    }
}

#[async_trait]
impl DialogueRunner for LocalDialogueRunner {
    async fn run(&self, request: DialogueRequest) -> DialogueReport {
        let first = self.factory.connect(&request.server_url);
        let second = self.factory.connect(request.second_endpoint());

        let params = DialogueParams::default()
            .with_max_prompt(request.max_prompt)
            .with_end_sessions(self.end_sessions);
        let mut input = RunDialogueInput::new(request.setting(), params);
        if let Some(server_id) = request.server_id {
            input = input.with_server_id(server_id);
        }

        RunDialogueUseCase::new(first, second)
            .with_store(Arc::clone(&self.store))
            .execute(input)
            .await
    }
}
