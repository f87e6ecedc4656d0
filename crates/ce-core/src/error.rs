// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Core error type and the user-facing status strings derived from it

use ce_contents_client::{ContentsError, ErrorKind};

use crate::history::HistoryError;

/// Errors surfaced by editor operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Contents(#[from] ContentsError),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("not signed in")]
    NotSignedIn,

    #[error("{0} is not open")]
    NotOpen(String),

    #[error("nothing is pending confirmation")]
    NothingPending,

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl Error {
    /// Taxonomy bucket for remote failures; `None` for local preconditions
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Contents(err) => Some(err.kind()),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == Some(ErrorKind::Conflict)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }
}

/// The editor operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Open,
    Save,
    Delete,
}

/// Status line shown to the user for a failed operation on `path`
pub fn user_message(operation: Operation, path: &str, err: &Error) -> String {
    match (err.kind(), operation) {
        (Some(ErrorKind::NotFound), _) => {
            format!("not found or insufficient permission: {}", path)
        }
        (Some(ErrorKind::Forbidden), _) => "forbidden or rate limited".to_string(),
        (Some(ErrorKind::Conflict), Operation::Save) => {
            "conflict: changed upstream, re-open before saving".to_string()
        }
        (Some(ErrorKind::Conflict), Operation::Delete) => {
            "conflict: changed upstream, re-open before deleting".to_string()
        }
        (Some(ErrorKind::Timeout), _) => "request timed out".to_string(),
        _ => err.to_string(),
    }
}
