// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration, credential and client wiring shared by all commands

use anyhow::{anyhow, Context, Result};
use ce_config::env::parse_set_flags;
use ce_config::{load_all, paths, Config};
use ce_contents_client::{AuthConfig, ClientOptions, ContentsClient, RetryPolicy};
use ce_core::{ControllerOptions, EditorController, HistoryStore};
use ce_domain_types::RepositoryContext;
use ce_logging::redact;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

pub type Controller = EditorController<ContentsClient>;

/// Repository selection shared by the file commands
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Repository as `owner/repo`
    pub repo: String,

    /// Branch to read from and commit to
    #[arg(long, short, default_value = "main")]
    pub branch: String,
}

impl RepoArgs {
    pub fn context(&self) -> Result<RepositoryContext> {
        RepositoryContext::from_slug(&self.repo, self.branch.clone())
            .ok_or_else(|| anyhow!("expected owner/repo, got '{}'", self.repo))
    }
}

/// Everything a command needs besides its own arguments
pub struct Environment {
    pub config: Config,
    token: Option<String>,
}

impl Environment {
    /// Load the layered configuration; `sets` are raw `--set key=value` flags
    pub fn load(cli_config: Option<PathBuf>, sets: &[String], token: Option<String>) -> Result<Self> {
        let paths = paths::discover_paths().with_cli_config(cli_config);
        let pairs = parse_set_flags(sets)?;
        let flags: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let resolved = load_all(&paths, &flags).context("Failed to load configuration")?;
        tracing::debug!(scopes = ?resolved.contributors, "Configuration loaded");
        let config = resolved.config().context("Invalid configuration")?;

        Ok(Self::new(config, token))
    }

    pub fn new(config: Config, token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self { config, token }
    }

    pub fn client_options(&self) -> ClientOptions {
        let transport = &self.config.transport;
        ClientOptions {
            user_agent: self.config.api.user_agent.clone(),
            retry: RetryPolicy {
                timeout: Duration::from_millis(transport.timeout_ms),
                retries: transport.rate_limit_retries,
                fallback_delay: Duration::from_millis(transport.fallback_retry_delay_ms),
            },
            affiliation: self.config.repositories.affiliation.clone(),
        }
    }

    /// Client carrying the credential
    pub fn client(&self) -> Result<ContentsClient> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| anyhow!("no credential: pass --token or set CE_TOKEN"))?;
        tracing::debug!(
            base_url = %self.config.api.base_url,
            token = %redact(token),
            "Creating contents client"
        );

        ContentsClient::from_url(
            &self.config.api.base_url,
            AuthConfig::bearer(token),
            self.client_options(),
        )
        .with_context(|| format!("Cannot use API base URL '{}'", self.config.api.base_url))
    }

    pub fn history(&self) -> Result<HistoryStore> {
        HistoryStore::from_config(&self.config.history).context("Cannot locate history storage")
    }

    /// Signed-in controller on `ctx`, recording into the history store
    pub fn controller(&self, ctx: RepositoryContext) -> Result<Controller> {
        let controller = EditorController::new(ControllerOptions::from_config(&self.config))
            .with_history(self.history()?);
        controller.sign_in(self.client()?);
        controller.set_context(ctx);
        Ok(controller)
    }
}
