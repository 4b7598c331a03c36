//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_backend;
pub mod conversation_store;
pub mod dialogue_runner;
pub mod progress;
