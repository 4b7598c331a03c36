//! Wire types for the chat backend protocol.
//!
//! Informal REST over JSON:
//!
//! - `POST {endpoint}/start` with `{serverId?}` returns `{chatId}`
//! - `POST {endpoint}/conversation` with `{chatId, prompt, serverId?}` returns `{response}`
//!
//! Field names are camelCase on the wire. Extra fields in replies (the
//! backend echoes `serverId`, for instance) are ignored.

use serde::{Deserialize, Serialize};

/// Route for opening a session
pub const START_PATH: &str = "start";

/// Route for sending a prompt within a session
pub const CONVERSATION_PATH: &str = "conversation";

/// Body of `POST /start`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<&'a str>,
}

/// Reply of `POST /start`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub chat_id: String,
}

/// Body of `POST /conversation`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest<'a> {
    pub chat_id: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<&'a str>,
}

/// Reply of `POST /conversation`
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationResponse {
    pub response: String,
}

/// Body of the optional teardown route
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest<'a> {
    pub chat_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<&'a str>,
}
