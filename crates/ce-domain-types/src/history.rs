// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Recently opened files and pinned repositories
//!
//! Both lists are most-recent-first and de-duplicated by their key. They are
//! hints for the search overlay only; file operations never depend on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RepositoryContext;

/// A file that was successfully opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
    pub opened_at: DateTime<Utc>,
}

impl RecentEntry {
    pub fn new(ctx: &RepositoryContext, path: impl Into<String>) -> Self {
        Self {
            owner: ctx.owner.clone(),
            repo: ctx.repo.clone(),
            branch: ctx.branch.clone(),
            path: path.into(),
            opened_at: Utc::now(),
        }
    }

    /// Same file on the same branch, ignoring the timestamp
    pub fn same_key(&self, other: &RecentEntry) -> bool {
        self.owner == other.owner
            && self.repo == other.repo
            && self.branch == other.branch
            && self.path == other.path
    }

    pub fn belongs_to(&self, ctx: &RepositoryContext) -> bool {
        self.owner == ctx.owner && self.repo == ctx.repo && self.branch == ctx.branch
    }
}

/// A repository the user pinned for quick access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedRepository {
    pub owner: String,
    pub repo: String,
    pub pinned_at: DateTime<Utc>,
}

impl PinnedRepository {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            pinned_at: Utc::now(),
        }
    }

    pub fn same_key(&self, other: &PinnedRepository) -> bool {
        self.owner == other.owner && self.repo == other.repo
    }
}
