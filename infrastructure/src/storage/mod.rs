//! Storage infrastructure: durable conversation stores.
//!
//! Provides [`JsonlConversationStore`], a JSONL file writer that implements
//! the [`ConversationStore`](duet_application::ConversationStore) port.

mod jsonl_store;

pub use jsonl_store::{ConversationRecord, JsonlConversationStore};
