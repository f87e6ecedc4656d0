// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Editor Controller - Owner of the Editing Session
//!
//! `EditorController` owns the credential-bearing client, the active
//! repository context, the open file, the directory tree cache and the pending
//! confirmation. Every mutation goes through one of its operations.
//!
//! State sits behind a `std::sync::Mutex` that is only held for short,
//! non-async sections. Remote calls run with the lock released, so operations
//! interleave freely; results are written back under the lock once they
//! arrive. Context changes bump an epoch so results that belong to an older
//! context are dropped.

use ce_config::{SearchConfig, SessionConfig};
use ce_domain_types::{
    AuthenticatedUser, LoadState, RecentEntry, RepositoryContext, RepositorySummary, WriteOutcome,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::contents_api::ContentsApi;
use crate::error::{user_message, Error, Operation};
use crate::file_index::{index_repository, FileIndex};
use crate::history::HistoryStore;
use crate::session::EditorSession;
use crate::tree::TreeNode;
use crate::tree_cache::{DirectoryTreeCache, ExpandStep};
use crate::Result;

/// Tunables of the controller, usually taken from the loaded configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub session: SessionConfig,
    pub search: SearchConfig,
    pub listing_limit: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            search: SearchConfig::default(),
            listing_limit: 30,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &ce_config::Config) -> Self {
        Self {
            session: config.session,
            search: config.search,
            listing_limit: config.repositories.listing_limit,
        }
    }
}

/// An operation waiting for the user's confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Delete { path: String },
}

struct ControllerState<A> {
    api: Option<Arc<A>>,
    ctx: RepositoryContext,
    session: EditorSession,
    tree: DirectoryTreeCache,
    pending: Option<PendingAction>,
    /// Sequence number of the latest issued open
    open_seq: u64,
    /// Bumped whenever the context or the credential changes
    epoch: u64,
}

pub struct EditorController<A: ContentsApi> {
    state: Mutex<ControllerState<A>>,
    options: ControllerOptions,
    history: Option<HistoryStore>,
}

impl<A: ContentsApi> EditorController<A> {
    pub fn new(options: ControllerOptions) -> Self {
        Self {
            state: Mutex::new(ControllerState {
                api: None,
                ctx: RepositoryContext::default(),
                session: EditorSession::default(),
                tree: DirectoryTreeCache::new(),
                pending: None,
                open_seq: 0,
                epoch: 0,
            }),
            options,
            history: None,
        }
    }

    /// Record opened files in `store`
    pub fn with_history(mut self, store: HistoryStore) -> Self {
        self.history = Some(store);
        self
    }

    pub fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    fn state(&self) -> MutexGuard<'_, ControllerState<A>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- credential -------------------------------------------------------

    /// Hold `api` as the authenticated client
    pub fn sign_in(&self, api: A) {
        let mut state = self.state();
        state.api = Some(Arc::new(api));
        state.epoch += 1;
        tracing::info!("Signed in");
    }

    /// Run the identity check first; a rejected client is not kept
    pub async fn sign_in_verified(&self, api: A) -> Result<AuthenticatedUser> {
        let user = api.current_user().await?;
        self.sign_in(api);
        tracing::info!(login = %user.login, "Identity verified");
        Ok(user)
    }

    /// Identity check for the held client
    ///
    /// Any HTTP rejection signs the controller out; timeouts and transport
    /// failures keep the credential.
    pub async fn verify(&self) -> Result<AuthenticatedUser> {
        let api = self.api()?;
        match api.current_user().await {
            Ok(user) => Ok(user),
            Err(e) => {
                if e.status().is_some() {
                    tracing::warn!(status = ?e.status(), "Credential rejected, signing out");
                    self.logout();
                }
                Err(e.into())
            }
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.state().api.is_some()
    }

    /// Drop the credential, the open file, the tree and any pending confirmation
    ///
    /// Persisted history is left alone.
    pub fn logout(&self) {
        let mut state = self.state();
        state.api = None;
        state.session.clear();
        state.tree.reset();
        state.pending = None;
        state.epoch += 1;
        tracing::info!("Signed out");
    }

    fn api(&self) -> Result<Arc<A>> {
        self.state().api.clone().ok_or(Error::NotSignedIn)
    }

    // --- context ----------------------------------------------------------

    pub fn context(&self) -> RepositoryContext {
        self.state().ctx.clone()
    }

    /// Switch repository/branch
    ///
    /// Resets the session, the tree cache and the pending confirmation in one
    /// step. Returns `false` when `ctx` is already active.
    pub fn set_context(&self, ctx: RepositoryContext) -> bool {
        let mut state = self.state();
        if state.ctx == ctx {
            return false;
        }
        tracing::info!(owner = %ctx.owner, repo = %ctx.repo, branch = %ctx.branch, "Switching context");
        state.ctx = ctx;
        state.session.clear();
        state.tree.reset();
        state.pending = None;
        state.epoch += 1;
        true
    }

    fn require_context(&self) -> Result<RepositoryContext> {
        let ctx = self.context();
        if ctx.owner.trim().is_empty() {
            return Err(Error::MissingField("owner"));
        }
        if ctx.repo.trim().is_empty() {
            return Err(Error::MissingField("repo"));
        }
        Ok(ctx)
    }

    // --- session ----------------------------------------------------------

    pub fn session(&self) -> EditorSession {
        self.state().session.clone()
    }

    /// Replace the buffered content of the open file
    pub fn set_content(&self, content: impl Into<String>) {
        self.state().session.content = content.into();
    }

    /// Start editing a file that does not exist remotely yet
    pub fn new_file(&self, path: &str) -> Result<()> {
        if path.trim().is_empty() {
            return Err(Error::MissingField("path"));
        }
        let mut state = self.state();
        state.session = EditorSession::new_file(path);
        Ok(())
    }

    /// Read `path` into the session
    ///
    /// On failure the previously loaded file stays in place and only
    /// `load_state`/`last_error` change.
    pub async fn open(&self, path: &str) -> Result<()> {
        let ctx = self.require_context()?;
        if path.trim().is_empty() {
            return Err(Error::MissingField("path"));
        }
        let api = self.api()?;

        let (seq, epoch) = {
            let mut state = self.state();
            state.open_seq += 1;
            state.session.load_state = LoadState::Loading;
            state.session.last_error = None;
            (state.open_seq, state.epoch)
        };
        tracing::debug!(owner = %ctx.owner, repo = %ctx.repo, path, seq, "Opening file");

        let result = api.read_text(&ctx, path).await.map_err(Error::from);

        {
            let mut state = self.state();
            if state.epoch != epoch {
                tracing::debug!(path, "Dropping open result for a previous context");
                return result.map(|_| ());
            }
            if self.options.session.discard_superseded_opens && state.open_seq != seq {
                tracing::debug!(path, seq, latest = state.open_seq, "Dropping superseded open");
                return result.map(|_| ());
            }

            match &result {
                Ok(file) => {
                    let session = &mut state.session;
                    session.path = path.to_string();
                    session.content = file.text.clone();
                    session.version_token = Some(file.version.clone());
                    session.load_state = LoadState::Loaded;
                    session.save_state = LoadState::Idle;
                    session.last_error = None;
                }
                Err(e) => {
                    state.session.load_state = LoadState::Error;
                    state.session.last_error = Some(user_message(Operation::Open, path, e));
                }
            }
        }

        if let Err(e) = &result {
            tracing::warn!(owner = %ctx.owner, repo = %ctx.repo, path, error = %e, "Open failed");
        }
        result?;

        tracing::info!(owner = %ctx.owner, repo = %ctx.repo, path, "Opened file");
        self.remember(&ctx, path).await;
        Ok(())
    }

    async fn remember(&self, ctx: &RepositoryContext, path: &str) {
        if let Some(history) = &self.history {
            if let Err(e) = history.record_recent(RecentEntry::new(ctx, path)).await {
                tracing::warn!(path, error = %e, "Could not record recent file");
            }
        }
    }

    /// Write the buffered content back
    ///
    /// Creates the file when no version token is held and updates it
    /// otherwise. The content is captured when the call starts. A blank
    /// `message` becomes `Update <path>`.
    pub async fn save(&self, message: Option<&str>) -> Result<WriteOutcome> {
        let ctx = self.require_context()?;
        let api = self.api()?;

        let (path, content, token, epoch) = {
            let mut state = self.state();
            if state.session.path.trim().is_empty() {
                return Err(Error::MissingField("path"));
            }
            state.session.save_state = LoadState::Loading;
            (
                state.session.path.clone(),
                state.session.content.clone(),
                state.session.version_token.clone(),
                state.epoch,
            )
        };

        let message = match message.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => format!("Update {path}"),
        };
        tracing::debug!(
            owner = %ctx.owner,
            repo = %ctx.repo,
            path,
            create = token.is_none(),
            "Saving file"
        );

        let result = api
            .put_text(&ctx, &path, &message, &content, token.as_ref())
            .await
            .map_err(Error::from);

        {
            let mut state = self.state();
            if state.epoch != epoch || state.session.path != path {
                tracing::debug!(path, "Session moved on, not storing save result");
                return result;
            }
            match &result {
                Ok(outcome) => {
                    let session = &mut state.session;
                    session.version_token = Some(outcome.version.clone());
                    session.load_state = LoadState::Loaded;
                    session.save_state = LoadState::Loaded;
                    session.last_error = None;
                }
                Err(e) => {
                    // The held token is kept as is, conflicts included
                    state.session.save_state = LoadState::Error;
                    state.session.last_error = Some(user_message(Operation::Save, &path, e));
                }
            }
        }

        match &result {
            Ok(outcome) => tracing::info!(
                owner = %ctx.owner,
                repo = %ctx.repo,
                path,
                version = %outcome.version,
                "Saved file"
            ),
            Err(e) => tracing::warn!(owner = %ctx.owner, repo = %ctx.repo, path, error = %e, "Save failed"),
        }
        result
    }

    /// Delete the open file `path` at its held version
    pub async fn delete(&self, path: &str, message: Option<&str>) -> Result<()> {
        let ctx = self.require_context()?;
        if path.trim().is_empty() {
            return Err(Error::MissingField("path"));
        }
        let api = self.api()?;

        let (token, epoch) = {
            let state = self.state();
            match (&state.session.version_token, state.session.holds(path)) {
                (Some(token), true) => (token.clone(), state.epoch),
                _ => return Err(Error::NotOpen(path.to_string())),
            }
        };

        let message = match message.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => format!("Delete {path}"),
        };

        let result = api
            .delete_file(&ctx, path, &message, &token)
            .await
            .map_err(Error::from);

        {
            let mut state = self.state();
            if state.epoch == epoch && state.session.path == path {
                match &result {
                    Ok(()) => state.session.clear(),
                    Err(e) => {
                        state.session.last_error = Some(user_message(Operation::Delete, path, e));
                    }
                }
            }
        }

        match &result {
            Ok(()) => tracing::info!(owner = %ctx.owner, repo = %ctx.repo, path, "Deleted file"),
            Err(e) => tracing::warn!(owner = %ctx.owner, repo = %ctx.repo, path, error = %e, "Delete failed"),
        }
        result
    }

    // --- confirmation -----------------------------------------------------

    /// Ask for confirmation before deleting the open file `path`
    pub fn request_delete(&self, path: &str) -> Result<()> {
        let mut state = self.state();
        if !state.session.holds(path) {
            return Err(Error::NotOpen(path.to_string()));
        }
        state.pending = Some(PendingAction::Delete {
            path: path.to_string(),
        });
        Ok(())
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.state().pending.clone()
    }

    /// Carry out the pending action
    pub async fn confirm_pending(&self, message: Option<&str>) -> Result<()> {
        let pending = self.state().pending.take();
        match pending {
            Some(PendingAction::Delete { path }) => self.delete(&path, message).await,
            None => Err(Error::NothingPending),
        }
    }

    /// Discard the pending action; returns whether there was one
    pub fn cancel_pending(&self) -> bool {
        self.state().pending.take().is_some()
    }

    // --- tree -------------------------------------------------------------

    pub fn tree(&self) -> Arc<TreeNode> {
        self.state().tree.root()
    }

    /// Load the root listing of the active context
    pub async fn load_root(&self) -> Result<()> {
        self.expand("").await
    }

    /// Expand a directory, listing it on first use
    pub async fn expand(&self, path: &str) -> Result<()> {
        let ctx = self.require_context()?;
        let api = self.api()?;

        let step = self.state().tree.begin_expand(path);
        let generation = match step {
            ExpandStep::Fetch { generation } => generation,
            ExpandStep::Cached | ExpandStep::InFlight => return Ok(()),
            ExpandStep::NotADirectory => {
                tracing::debug!(path, "Nothing to expand");
                return Ok(());
            }
        };

        tracing::debug!(owner = %ctx.owner, repo = %ctx.repo, path, "Listing directory");
        let listing = api.list_directory(&ctx, path).await;

        let stored = self.state().tree.finish_expand(path, generation, &listing);
        if !stored {
            tracing::debug!(path, "Dropping listing for a previous context");
        }
        match listing {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!(owner = %ctx.owner, repo = %ctx.repo, path, error = %e, "Listing failed");
                Err(e.into())
            }
        }
    }

    pub fn collapse(&self, path: &str) {
        self.state().tree.collapse(path);
    }

    /// Loaded file paths in display order
    pub fn flatten(&self) -> Vec<String> {
        self.state().tree.flatten()
    }

    pub fn filtered_tree(&self, query: &str) -> TreeNode {
        self.state().tree.filtered(query)
    }

    // --- repository-wide --------------------------------------------------

    /// Editable repositories, capped at the configured listing limit
    pub async fn list_repositories(&self) -> Result<Vec<RepositorySummary>> {
        let api = self.api()?;
        Ok(api
            .list_accessible_repositories(self.options.listing_limit)
            .await?)
    }

    /// Walk the active repository for the search overlay
    pub async fn index(&self) -> Result<FileIndex> {
        let ctx = self.require_context()?;
        let api = self.api()?;
        index_repository(api.as_ref(), &ctx, self.options.search).await
    }

    /// Recently opened files of the active context
    pub async fn recents(&self) -> Vec<RecentEntry> {
        let ctx = self.context();
        match &self.history {
            Some(history) => history.recents_for(&ctx).await,
            None => Vec::new(),
        }
    }
}
