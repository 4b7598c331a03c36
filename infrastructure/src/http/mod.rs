//! HTTP adapters: chat backends and the trigger server client

mod chat_client;
mod error;
pub mod protocol;
mod trigger_client;

pub use chat_client::{HttpChatBackend, HttpChatBackendFactory};
pub use error::HttpError;
pub use trigger_client::TriggerDialogueRunner;
