//! Domain layer for duet
//!
//! This crate contains the core entities, value objects and policies.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Dialogue
//!
//! Two remote chat participants talk to each other: every reply from one side
//! becomes the next prompt of the other. Each completed round yields one
//! [`ExchangePair`]; each run ends with one [`DialogueReport`].
//!
//! ## Workers
//!
//! A worker runs dialogues back to back against its own pair of endpoints,
//! tracked by [`WorkerState`], until it is stopped or gives up after too many
//! consecutive failures.

pub mod core;
pub mod dialogue;
pub mod prompt;
pub mod retry;
pub mod worker;

// Re-export commonly used types
pub use core::error::DomainError;
pub use core::validation::{ConfigIssue, ConfigIssueCode, Severity};
pub use dialogue::{
    entities::{
        ChatSetting, DialogueOutcome, DialoguePhase, DialogueReport, ExchangePair, SUCCESS_MESSAGE,
    },
    value_objects::{ChatId, Endpoint, ServerId},
};
pub use prompt::{PromptTemplate, TOPIC_TOKEN};
pub use retry::backoff::BackoffPolicy;
pub use worker::state::{WorkerExit, WorkerState, WorkerSummary};
