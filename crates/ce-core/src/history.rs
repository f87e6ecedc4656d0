// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Durable recents and pinned repositories
//!
//! Both lists live in one `history.json`. Every mutation is a
//! load-modify-save cycle serialized by an async lock, and saving goes through
//! a temporary file renamed over the old one. Reading never fails on a corrupt
//! file: it is logged and treated as empty.

use ce_config::{paths, HistoryConfig};
use ce_domain_types::{PinnedRepository, RecentEntry, RepositoryContext};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::sync::Mutex;

pub const HISTORY_FILE: &str = "history.json";

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no data directory available on this platform")]
    NoStorageDir,
}

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// On-disk document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub recent: Vec<RecentEntry>,
    #[serde(default)]
    pub pinned: Vec<PinnedRepository>,
}

impl History {
    /// Move `entry` to the front, dropping older copies and the overflow
    pub fn push_recent(&mut self, entry: RecentEntry, cap: usize) {
        self.recent.retain(|e| !e.same_key(&entry));
        self.recent.insert(0, entry);
        self.recent.truncate(cap);
    }

    pub fn push_pinned(&mut self, pin: PinnedRepository, cap: usize) {
        self.pinned.retain(|p| !p.same_key(&pin));
        self.pinned.insert(0, pin);
        self.pinned.truncate(cap);
    }
}

/// Resolve the storage directory
///
/// Precedence: `history.storage-path` > `CE_HOME` > platform data dir
pub fn storage_dir(config: &HistoryConfig) -> HistoryResult<PathBuf> {
    if let Some(custom) = &config.storage_path {
        return Ok(custom.clone());
    }
    if let Some(home) = paths::ce_home() {
        return Ok(home);
    }
    dirs::data_dir()
        .map(|dir| dir.join(paths::APP_DIR))
        .ok_or(HistoryError::NoStorageDir)
}

#[derive(Debug)]
pub struct HistoryStore {
    file: PathBuf,
    max_recent: usize,
    max_pinned: usize,
    lock: Mutex<()>,
}

impl HistoryStore {
    /// Store keeping `history.json` inside `dir`
    pub fn new(dir: impl AsRef<Path>, max_recent: usize, max_pinned: usize) -> Self {
        Self {
            file: dir.as_ref().join(HISTORY_FILE),
            max_recent,
            max_pinned,
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &HistoryConfig) -> HistoryResult<Self> {
        Ok(Self::new(storage_dir(config)?, config.max_recent, config.max_pinned))
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Current history; missing or corrupt files read as empty
    pub async fn load(&self) -> History {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    pub async fn record_recent(&self, entry: RecentEntry) -> HistoryResult<()> {
        let _guard = self.lock.lock().await;
        let mut history = self.read().await;
        history.push_recent(entry, self.max_recent);
        self.write(&history).await
    }

    pub async fn pin(&self, owner: &str, repo: &str) -> HistoryResult<()> {
        let _guard = self.lock.lock().await;
        let mut history = self.read().await;
        history.push_pinned(PinnedRepository::new(owner, repo), self.max_pinned);
        self.write(&history).await
    }

    /// Returns whether the repository was pinned
    pub async fn unpin(&self, owner: &str, repo: &str) -> HistoryResult<bool> {
        let _guard = self.lock.lock().await;
        let mut history = self.read().await;
        let before = history.pinned.len();
        history.pinned.retain(|p| !(p.owner == owner && p.repo == repo));
        if history.pinned.len() == before {
            return Ok(false);
        }
        self.write(&history).await?;
        Ok(true)
    }

    /// Recent files of one repository/branch, most recent first
    pub async fn recents_for(&self, ctx: &RepositoryContext) -> Vec<RecentEntry> {
        self.load()
            .await
            .recent
            .into_iter()
            .filter(|e| e.belongs_to(ctx))
            .collect()
    }

    async fn read(&self) -> History {
        let content = match async_fs::read_to_string(&self.file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return History::default(),
            Err(e) => {
                tracing::warn!(file = %self.file.display(), error = %e, "Cannot read history");
                return History::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(file = %self.file.display(), error = %e, "Ignoring corrupt history");
            History::default()
        })
    }

    async fn write(&self, history: &History) -> HistoryResult<()> {
        if let Some(parent) = self.file.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(history)?;

        let temp_file = self.file.with_extension("json.tmp");
        async_fs::write(&temp_file, content).await?;
        async_fs::rename(&temp_file, &self.file).await?;

        tracing::debug!(
            file = %self.file.display(),
            recent = history.recent.len(),
            pinned = history.pinned.len(),
            "Saved history"
        );
        Ok(())
    }
}
