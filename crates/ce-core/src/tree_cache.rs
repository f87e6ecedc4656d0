// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Lazily populated mirror of one repository/branch
//!
//! The cache itself never awaits. An expansion is split in two steps,
//! [`DirectoryTreeCache::begin_expand`] and [`DirectoryTreeCache::finish_expand`],
//! so the caller can run the listing without holding any lock. Each reset
//! bumps the generation; a listing that finishes under an older generation
//! is dropped.

use ce_domain_types::DirectoryEntry;
use std::sync::Arc;

use crate::tree::{self, NodePatch, TreeNode};

/// What the caller has to do after [`DirectoryTreeCache::begin_expand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandStep {
    /// Children are cached; the node was only marked expanded
    Cached,
    /// Another listing for the node is already running
    InFlight,
    /// List the directory and report back with this generation
    Fetch { generation: u64 },
    /// No directory at that path
    NotADirectory,
}

#[derive(Debug, Clone)]
pub struct DirectoryTreeCache {
    root: Arc<TreeNode>,
    generation: u64,
}

impl Default for DirectoryTreeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryTreeCache {
    pub fn new() -> Self {
        Self {
            root: Arc::new(TreeNode::root()),
            generation: 0,
        }
    }

    pub fn root(&self) -> Arc<TreeNode> {
        Arc::clone(&self.root)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn find(&self, path: &str) -> Option<Arc<TreeNode>> {
        tree::find(&self.root, path).cloned()
    }

    /// Discard everything and start over from an unloaded root
    pub fn reset(&mut self) {
        self.root = Arc::new(TreeNode::root());
        self.generation += 1;
    }

    pub fn apply(&mut self, path: &str, patch: &NodePatch) {
        self.root = tree::apply_patch(&self.root, path, patch);
    }

    /// Mark `path` expanded and decide whether a listing is needed
    pub fn begin_expand(&mut self, path: &str) -> ExpandStep {
        let Some(node) = self.find(path).filter(|n| n.is_dir()) else {
            return ExpandStep::NotADirectory;
        };

        if node.loaded {
            if !node.expanded {
                self.apply(path, &NodePatch::new().expanded(true));
            }
            return ExpandStep::Cached;
        }
        if node.loading {
            return ExpandStep::InFlight;
        }

        self.apply(path, &NodePatch::new().loading(true).expanded(true));
        ExpandStep::Fetch {
            generation: self.generation,
        }
    }

    /// Store the outcome of a listing started by [`Self::begin_expand`]
    ///
    /// Returns `false` when the result belongs to a previous generation and
    /// was discarded. A failed listing leaves the node unloaded and collapsed.
    pub fn finish_expand<E>(
        &mut self,
        path: &str,
        generation: u64,
        listing: &Result<Vec<DirectoryEntry>, E>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        let patch = match listing {
            Ok(entries) => NodePatch::new()
                .children(tree::children_from_listing(entries))
                .loaded(true)
                .loading(false)
                .expanded(true),
            Err(_) => NodePatch::new().loading(false).expanded(false),
        };
        self.apply(path, &patch);
        true
    }

    /// Collapse a directory, keeping its cached children
    pub fn collapse(&mut self, path: &str) {
        if self.find(path).is_some_and(|n| n.expanded) {
            self.apply(path, &NodePatch::new().expanded(false));
        }
    }

    /// Loaded file paths in display order
    pub fn flatten(&self) -> Vec<String> {
        tree::flatten(&self.root)
    }

    /// Filtered copy of the current tree
    pub fn filtered(&self, query: &str) -> TreeNode {
        tree::filter(&self.root, query)
    }
}
