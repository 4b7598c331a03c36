//! Per-attempt HTTP failures

use thiserror::Error;

/// Why a single HTTP attempt failed.
///
/// These never leave the adapter; once the retry budget is spent they are
/// folded into the port's own error type.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed reply: {0}")]
    Decode(String),
}

/// Longest response body excerpt kept in an error message
const BODY_EXCERPT_CHARS: usize = 200;

impl HttpError {
    pub(crate) fn status(status: reqwest::StatusCode, body: &str) -> Self {
        HttpError::Status {
            status: status.as_u16(),
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }
}
