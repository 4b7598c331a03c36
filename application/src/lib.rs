//! Application layer for duet
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod retry;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DialogueParams, SchedulerParams};
pub use ports::{
    chat_backend::{ChatBackend, ChatBackendFactory, RemoteError, SendResult, StartResult},
    conversation_store::{
        ConversationStore, InMemoryConversationStore, NoConversationStore, StoreError,
    },
    dialogue_runner::{
        DialogueRequest, DialogueRunner, GENERATE_CONVERSATION_PATH, TriggerReply,
    },
    progress::{NoProgress, SchedulerProgress},
};
pub use retry::{RetryExhausted, retry_with_backoff};
pub use use_cases::run_dialogue::{LocalDialogueRunner, RunDialogueInput, RunDialogueUseCase};
pub use use_cases::run_workers::{RunWorkersUseCase, WorkerAssignment};
