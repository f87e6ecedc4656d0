// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Contents API domain types
//!
//! Version tokens, directory entries and file blobs as exchanged with the
//! remote host's contents endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque content hash identifying the exact remote state of one file
///
/// Acts as the compare-and-swap tag for updates and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Entry type as reported by the contents API `type` field
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        matches!(self, EntryKind::Dir)
    }
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "sha")]
    pub version: VersionToken,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// Raw file read result, content still base64 encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub version: VersionToken,
    pub content_base64: String,
}

/// Decoded file read result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileText {
    pub version: VersionToken,
    pub text: String,
}

/// Result of a create or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub version: VersionToken,
    /// Commit created by the write, when the host reports one
    pub commit: Option<String>,
}
