//! Dialogue value objects - opaque identifiers and endpoint addresses.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session token returned by a participant's `start` call (Value Object)
///
/// Owned by the dialogue that created it and never shared across workers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Participant/server identifier forwarded to the chat backend as `serverId`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier used for the worker at `index` (`server_0`, `server_1`, ...)
    pub fn for_worker(index: usize) -> Self {
        Self(format!("server_{}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base URL of a chat backend or trigger server.
///
/// Stored without a trailing slash so that [`Endpoint::join`] always yields
/// exactly one separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint(String);

impl Endpoint {
    pub fn try_new(url: impl Into<String>) -> Result<Self, DomainError> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(DomainError::InvalidEndpoint("endpoint URL is empty".to_string()));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(DomainError::InvalidEndpoint(format!(
                "'{}' must start with http:// or https://",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Endpoint for worker `index`: `{host}:{base_port + index}`
    pub fn with_port_offset(host: &str, base_port: u16, index: usize) -> Result<Self, DomainError> {
        let port = u16::try_from(index)
            .ok()
            .and_then(|offset| base_port.checked_add(offset))
            .ok_or_else(|| {
                DomainError::InvalidEndpoint(format!(
                    "port {} + {} is out of range",
                    base_port, index
                ))
            })?;
        Self::try_new(format!("{}:{}", host.trim_end_matches('/'), port))
    }

    /// Append a route to the base URL
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Endpoint {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Endpoint> for String {
    fn from(value: Endpoint) -> Self {
        value.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
