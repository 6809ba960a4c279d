use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Connection, TLS or body streaming failure.
    Transport,
    /// The upstream answered with a non-success status.
    UpstreamStatus,
    /// The payload did not match the expected shape.
    MalformedPayload,
}

/// Failure of a single upstream fetch. Controllers collapse every code into
/// "fetch failed"; the code only feeds diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{code:?}: {message}")]
pub struct FetchError {
    pub code: ErrorCode,
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: None,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Transport, message)
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::UpstreamStatus,
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedPayload, message)
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
