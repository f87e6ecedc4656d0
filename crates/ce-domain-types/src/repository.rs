// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Repository-related domain types
//!
//! Types identifying a repository/branch on the remote host and summarizing
//! the repositories an authenticated user can reach.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The `(owner, repository, branch)` triple every remote operation is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RepositoryContext {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepositoryContext {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Parse an `owner/repo` slug, pairing it with `branch`
    pub fn from_slug(slug: &str, branch: impl Into<String>) -> Option<Self> {
        let (owner, repo) = slug.trim().trim_matches('/').split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self::new(owner, repo, branch))
    }

    /// `owner/repo` without the branch
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// True when both owner and repository name are set
    pub fn is_complete(&self) -> bool {
        !self.owner.trim().is_empty() && !self.repo.trim().is_empty()
    }
}

impl fmt::Display for RepositoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Permissions the authenticated user holds on a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryPermissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

/// Owner block of a repository listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// One entry of the accessible-repositories listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub full_name: String,
    pub name: String,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub archived: bool,
    /// Missing when the listing was made without user context
    #[serde(default)]
    pub permissions: Option<RepositoryPermissions>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl RepositorySummary {
    /// Writable and not archived
    pub fn is_editable(&self) -> bool {
        !self.archived && self.permissions.map(|p| p.push).unwrap_or(false)
    }

    /// Context for this repository on its default branch, or `fallback_branch`
    pub fn context(&self, fallback_branch: &str) -> RepositoryContext {
        RepositoryContext::new(
            self.owner.login.clone(),
            self.name.clone(),
            self.default_branch.clone().unwrap_or_else(|| fallback_branch.to_string()),
        )
    }
}

/// Result of the `/user` identity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
}
