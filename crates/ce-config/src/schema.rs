// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration sections and the schema root
//!
//! [`Config`] is the canonical shape of the whole configuration. It is used
//! to generate the JSON schema that every file layer is validated against,
//! and it is the typed result of extraction. Each section can also be
//! extracted on its own with [`crate::extract::get_at`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "contents-editor/0.1";
pub const DEFAULT_AFFILIATION: &str = "owner,collaborator,organization_member";

/// The root configuration schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub repositories: RepositoriesConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Remote host endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ApiConfig {
    /// API root; enterprise hosts usually end in `/api/v3`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Deadline and rate-limit retry budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TransportConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_rate_limit_retries")]
    pub rate_limit_retries: u32,
    /// Wait used when `Retry-After` is absent or not positive
    #[serde(default = "default_fallback_retry_delay_ms")]
    pub fallback_retry_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            rate_limit_retries: default_rate_limit_retries(),
            fallback_retry_delay_ms: default_fallback_retry_delay_ms(),
        }
    }
}

/// Accessible-repositories listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepositoriesConfig {
    #[serde(default = "default_listing_limit")]
    pub listing_limit: usize,
    #[serde(default = "default_affiliation")]
    pub affiliation: String,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        Self {
            listing_limit: default_listing_limit(),
            affiliation: default_affiliation(),
        }
    }
}

/// Bounds of the repository walk feeding the search overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SearchConfig {
    /// Deepest directory level that is still listed (the root is level 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_files: default_max_files(),
        }
    }
}

/// Recents and pinned repositories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct HistoryConfig {
    /// Custom storage directory for `history.json`
    /// If not set, uses `CE_HOME` or the platform data directory
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default = "default_max_recent")]
    pub max_recent: usize,
    #[serde(default = "default_max_pinned")]
    pub max_pinned: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            max_recent: default_max_recent(),
            max_pinned: default_max_pinned(),
        }
    }
}

/// Editor session behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SessionConfig {
    /// Drop open responses that are not from the latest issued open
    #[serde(default)]
    pub discard_superseded_opens: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_rate_limit_retries() -> u32 {
    1
}

fn default_fallback_retry_delay_ms() -> u64 {
    1_000
}

fn default_listing_limit() -> usize {
    30
}

fn default_affiliation() -> String {
    DEFAULT_AFFILIATION.to_string()
}

fn default_max_depth() -> usize {
    4
}

fn default_max_files() -> usize {
    500
}

fn default_max_recent() -> usize {
    20
}

fn default_max_pinned() -> usize {
    20
}
