// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the contents client

use std::time::Duration;

/// Result type alias for contents client operations
pub type Result<T> = std::result::Result<T, ContentsError>;

/// A non-2xx response, kept verbatim for domain-level interpretation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP {status} {status_text}: {body}")]
pub struct HttpError {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpError {
    /// The host's `message` field when the body is a JSON error document
    pub fn host_message(&self) -> Option<String> {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()?
            .get("message")?
            .as_str()
            .map(str::to_string)
    }
}

/// Failure taxonomy shared by every operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 404
    NotFound,
    /// 403, or 429 once the rate-limit retry is spent
    Forbidden,
    /// 409, the supplied version token is stale
    Conflict,
    /// Client-side deadline elapsed
    Timeout,
    /// Unexpected body shape or undecodable content
    Malformed,
    /// Any other status or transport failure
    Unknown,
}

/// Errors produced by the contents client
#[derive(Debug, thiserror::Error)]
pub enum ContentsError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("base URL cannot carry a path: {0}")]
    InvalidBaseUrl(String),

    #[error("authentication error: {0}")]
    Auth(String),
}

impl ContentsError {
    /// Classify this error into the shared taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContentsError::Http(http) => match http.status {
                404 => ErrorKind::NotFound,
                403 | 429 => ErrorKind::Forbidden,
                409 => ErrorKind::Conflict,
                _ => ErrorKind::Unknown,
            },
            ContentsError::Timeout(_) => ErrorKind::Timeout,
            ContentsError::Malformed(_) => ErrorKind::Malformed,
            ContentsError::Transport(_)
            | ContentsError::Url(_)
            | ContentsError::InvalidBaseUrl(_)
            | ContentsError::Auth(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status, when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ContentsError::Http(http) => Some(http.status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ContentsError {
    fn from(err: reqwest::Error) -> Self {
        ContentsError::Transport(err.to_string())
    }
}
