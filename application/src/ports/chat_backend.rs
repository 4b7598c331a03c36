//! Chat backend port
//!
//! Defines the interface for talking to one remote chat participant.

use async_trait::async_trait;
use duet_domain::{ChatId, Endpoint, ServerId};
use std::sync::Arc;
use thiserror::Error;

/// Failure of a remote chat call after its retry budget was spent.
///
/// Network errors, non-success statuses and malformed bodies all collapse
/// into this one kind; the last failure is kept for diagnostics only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("{endpoint} unavailable after {attempts} attempts: {last_failure}")]
    Unavailable {
        endpoint: String,
        attempts: u32,
        last_failure: String,
    },
}

impl RemoteError {
    pub fn unavailable(
        endpoint: impl Into<String>,
        attempts: u32,
        last_failure: impl Into<String>,
    ) -> Self {
        RemoteError::Unavailable {
            endpoint: endpoint.into(),
            attempts,
            last_failure: last_failure.into(),
        }
    }
}

/// Outcome of a `start` call: the new session or why none was opened
pub type StartResult = Result<ChatId, RemoteError>;

/// Outcome of a `send` call: the reply text or why none arrived
pub type SendResult = Result<String, RemoteError>;

/// One remote chat participant.
///
/// Implementations must be callable concurrently for different chat ids and
/// keep no per-call state beyond what the caller passes in.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Base URL this backend talks to
    fn endpoint(&self) -> &Endpoint;

    /// Open a new chat session
    async fn start(&self, server_id: Option<&ServerId>) -> StartResult;

    /// Send a prompt within a session and return the reply
    async fn send(
        &self,
        chat_id: &ChatId,
        prompt: &str,
        server_id: Option<&ServerId>,
    ) -> SendResult;

    /// Release a session on the backend.
    ///
    /// The chat protocol has no teardown route, so the default does nothing
    /// and sessions expire on the backend's own inactivity timer.
    async fn end_session(
        &self,
        _chat_id: &ChatId,
        _server_id: Option<&ServerId>,
    ) -> Result<(), RemoteError> {
        Ok(())
    }
}

/// Builds chat backends for endpoints named at run time (e.g. in a trigger request)
pub trait ChatBackendFactory: Send + Sync {
    fn connect(&self, endpoint: &Endpoint) -> Arc<dyn ChatBackend>;
}
