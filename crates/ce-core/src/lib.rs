// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Editor core for files that live in a remote contents API
//!
//! The crate keeps a lazily loaded mirror of a repository's directory tree,
//! drives the open/save/delete workflow under optimistic concurrency (the
//! version token is the compare-and-swap tag) and persists the user's recent
//! files. It talks to the host only through the [`ContentsApi`] trait.

pub mod contents_api;
pub mod controller;
pub mod error;
pub mod file_index;
pub mod history;
pub mod session;
pub mod tree;
pub mod tree_cache;

pub use contents_api::{ApiResult, ContentsApi};
pub use controller::{ControllerOptions, EditorController, PendingAction};
pub use error::{user_message, Error, Operation};
pub use file_index::{index_repository, FileIndex};
pub use history::{History, HistoryError, HistoryStore};
pub use session::EditorSession;
pub use tree::{NodeKind, NodePatch, TreeNode};
pub use tree_cache::{DirectoryTreeCache, ExpandStep};

pub type Result<T> = std::result::Result<T, Error>;
