// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Recent files and pinned repositories

use anyhow::{anyhow, Result};
use ce_domain_types::RepositoryContext;
use clap::Args;

use crate::Environment;

#[derive(Args, Debug, Clone)]
pub struct RecentArgs {
    /// Only files of this `owner/repo`
    pub repo: Option<String>,

    /// Branch used with a repository filter
    #[arg(long, short, default_value = "main")]
    pub branch: String,
}

impl RecentArgs {
    pub async fn run(self, env: &Environment) -> Result<()> {
        let store = env.history()?;
        let entries = match &self.repo {
            Some(slug) => {
                let ctx = RepositoryContext::from_slug(slug, self.branch.clone())
                    .ok_or_else(|| anyhow!("expected owner/repo, got '{}'", slug))?;
                store.recents_for(&ctx).await
            }
            None => store.load().await.recent,
        };

        for entry in entries {
            println!(
                "{}/{}@{}\t{}\t{}",
                entry.owner,
                entry.repo,
                entry.branch,
                entry.path,
                entry.opened_at.format("%Y-%m-%d %H:%M")
            );
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct PinArgs {
    /// Repository as `owner/repo`
    pub repo: String,
}

impl PinArgs {
    fn split(&self) -> Result<(&str, &str)> {
        self.repo
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| anyhow!("expected owner/repo, got '{}'", self.repo))
    }

    pub async fn pin(self, env: &Environment) -> Result<()> {
        let (owner, repo) = self.split()?;
        env.history()?.pin(owner, repo).await?;
        println!("Pinned {}", self.repo);
        Ok(())
    }

    pub async fn unpin(self, env: &Environment) -> Result<()> {
        let (owner, repo) = self.split()?;
        if env.history()?.unpin(owner, repo).await? {
            println!("Unpinned {}", self.repo);
        } else {
            println!("{} was not pinned", self.repo);
        }
        Ok(())
    }
}

pub async fn list_pins(env: &Environment) -> Result<()> {
    for pin in env.history()?.load().await.pinned {
        println!("{}/{}", pin.owner, pin.repo);
    }
    Ok(())
}
