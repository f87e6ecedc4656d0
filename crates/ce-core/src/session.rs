// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The record of the currently open file

use ce_domain_types::{LoadState, VersionToken};
use serde::Serialize;

/// In-memory state of the open file
///
/// `version_token` is the compare-and-swap tag of the last successful read or
/// write of `path`; `None` means the file does not exist remotely yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditorSession {
    pub path: String,
    pub content: String,
    pub version_token: Option<VersionToken>,
    pub load_state: LoadState,
    pub save_state: LoadState,
    /// Status line of the most recent failure
    pub last_error: Option<String>,
}

impl EditorSession {
    /// A session for a file that has not been created yet
    pub fn new_file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Back to an empty, idle session
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// `path` is the buffered file and carries a token from a successful read
    ///
    /// A later failed open leaves this true.
    pub fn holds(&self, path: &str) -> bool {
        self.path == path && self.version_token.is_some()
    }

    pub fn is_new_file(&self) -> bool {
        !self.path.is_empty() && self.version_token.is_none()
    }
}
