// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Identity and repository listing commands

use anyhow::Result;
use ce_core::{ControllerOptions, EditorController};
use clap::Args;

use crate::Environment;

#[derive(Args, Debug, Clone)]
pub struct WhoamiArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl WhoamiArgs {
    pub async fn run(self, env: &Environment) -> Result<()> {
        let controller = EditorController::new(ControllerOptions::from_config(&env.config));
        let user = controller.sign_in_verified(env.client()?).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&user)?);
            return Ok(());
        }
        match &user.name {
            Some(name) => println!("{} ({})", user.login, name),
            None => println!("{}", user.login),
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReposArgs {
    /// Maximum number of repositories to show
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl ReposArgs {
    pub async fn run(self, env: &Environment) -> Result<()> {
        let mut options = ControllerOptions::from_config(&env.config);
        if let Some(limit) = self.limit {
            options.listing_limit = limit;
        }
        let controller = EditorController::new(options);
        controller.sign_in(env.client()?);

        let repos = controller.list_repositories().await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&repos)?);
            return Ok(());
        }
        for repo in &repos {
            let branch = repo.default_branch.as_deref().unwrap_or("-");
            let visibility = if repo.private { "private" } else { "public" };
            println!("{}\t{}\t{}", repo.full_name, branch, visibility);
        }
        Ok(())
    }
}
