//! Infrastructure layer for duet
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod http;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig, RunnerMode};
pub use http::{HttpChatBackend, HttpChatBackendFactory, TriggerDialogueRunner};
pub use storage::JsonlConversationStore;
