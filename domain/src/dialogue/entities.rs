//! Dialogue entities - what a two-party conversation consumes and produces.
//!
//! - [`ChatSetting`] - topic and opening instructions for one dialogue
//! - [`ExchangePair`] - one completed round (A's reply, B's reply)
//! - [`DialogueReport`] - terminal report of one dialogue run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message reported by a dialogue that ran all of its rounds.
pub const SUCCESS_MESSAGE: &str = "Conversation generated successfully";

/// Topic and opening instructions for a dialogue.
///
/// Read-only once a dialogue starts. A worker swaps the topic between
/// dialogues with [`ChatSetting::with_topic`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSetting {
    pub topic: String,
    pub initial_message: String,
}

impl ChatSetting {
    pub fn new(topic: impl Into<String>, initial_message: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            initial_message: initial_message.into(),
        }
    }

    /// Same instructions, different topic
    pub fn with_topic(&self, topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            initial_message: self.initial_message.clone(),
        }
    }
}

/// One completed exchange round.
///
/// Constructed once per round, after both halves succeeded, and never mutated
/// afterwards except for `updated_at` by a store that rewrites the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePair {
    /// Participant A's reply for this round
    pub first_participant_response: String,
    /// Participant B's reply to A's reply
    pub second_participant_response: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExchangePair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            first_participant_response: first.into(),
            second_participant_response: second.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Phase of the dialogue state machine in which a remote call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    /// Opening a session on each participant
    Init,
    /// Sending the opening prompts
    Seed,
    /// Alternating replies between the participants
    Exchange,
}

impl DialoguePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialoguePhase::Init => "init",
            DialoguePhase::Seed => "seed",
            DialoguePhase::Exchange => "exchange",
        }
    }
}

impl fmt::Display for DialoguePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of a dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueOutcome {
    /// All `max_prompt` rounds completed
    Completed,
    /// An exchange round failed; earlier rounds were kept
    StoppedEarly,
    /// Init or Seed failed; nothing was exchanged
    Aborted,
}

impl DialogueOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueOutcome::Completed => "completed",
            DialogueOutcome::StoppedEarly => "stopped_early",
            DialogueOutcome::Aborted => "aborted",
        }
    }
}

impl fmt::Display for DialogueOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal report of one dialogue: how far it got and why it ended.
///
/// A dialogue never raises; every run ends in exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueReport {
    pub outcome: DialogueOutcome,
    pub pairs_generated: usize,
    pub message: String,
}

impl DialogueReport {
    pub fn completed(pairs_generated: usize) -> Self {
        Self {
            outcome: DialogueOutcome::Completed,
            pairs_generated,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn stopped_early(pairs_generated: usize, reason: impl fmt::Display) -> Self {
        Self {
            outcome: DialogueOutcome::StoppedEarly,
            pairs_generated,
            message: format!(
                "Conversation stopped after {} pairs: {}",
                pairs_generated, reason
            ),
        }
    }

    pub fn aborted(phase: DialoguePhase, reason: impl fmt::Display) -> Self {
        Self {
            outcome: DialogueOutcome::Aborted,
            pairs_generated: 0,
            message: format!("Conversation aborted during {}: {}", phase, reason),
        }
    }

    /// Whether a worker should treat this dialogue as a success.
    ///
    /// Early termination still counts when at least one round was kept.
    pub fn is_success(&self) -> bool {
        match self.outcome {
            DialogueOutcome::Completed => true,
            DialogueOutcome::StoppedEarly => self.pairs_generated > 0,
            DialogueOutcome::Aborted => false,
        }
    }
}
