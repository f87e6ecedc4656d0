// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! File commands: each one drives a single editor session

use anyhow::{anyhow, Context, Result};
use ce_core::{tree, user_message, Operation};
use clap::Args;
use std::path::PathBuf;

use crate::environment::RepoArgs;
use crate::Environment;

/// Turn a core failure into the status line shown for `operation`
fn status(operation: Operation, path: &str) -> impl FnOnce(ce_core::Error) -> anyhow::Error + '_ {
    move |err| anyhow!(user_message(operation, path, &err))
}

#[derive(Args, Debug, Clone)]
pub struct LsArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Directory inside the repository (default: root)
    #[arg(default_value = "")]
    pub path: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl LsArgs {
    pub async fn run(self, env: &Environment) -> Result<()> {
        let controller = env.controller(self.repo.context()?)?;
        controller.load_root().await?;

        // Expand every ancestor so the tree reaches the requested directory
        let mut target = String::new();
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            if !target.is_empty() {
                target.push('/');
            }
            target.push_str(segment);
            controller.expand(&target).await?;
        }

        let root = controller.tree();
        let node = tree::find(&root, &target).ok_or_else(|| anyhow!("{} not found", target))?;
        let listed: Vec<_> = if node.is_dir() {
            node.children().to_vec()
        } else {
            vec![node.clone()]
        };

        if self.json {
            let entries: Vec<_> = listed
                .iter()
                .map(|n| {
                    serde_json::json!({
                        "name": n.name,
                        "path": n.path,
                        "type": if n.is_dir() { "dir" } else { "file" },
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }
        for entry in listed {
            if entry.is_dir() {
                println!("{}/", entry.name);
            } else {
                println!("{}", entry.name);
            }
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct CatArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// File inside the repository
    pub path: String,
}

impl CatArgs {
    pub async fn run(self, env: &Environment) -> Result<()> {
        let controller = env.controller(self.repo.context()?)?;
        controller
            .open(&self.path)
            .await
            .map_err(status(Operation::Open, &self.path))?;
        print!("{}", controller.session().content);
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct PutArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Destination inside the repository
    pub path: String,

    /// Local file to upload
    #[arg(long, short)]
    pub file: PathBuf,

    /// Commit message (default: "Update <path>")
    #[arg(long, short)]
    pub message: Option<String>,
}

impl PutArgs {
    pub async fn run(self, env: &Environment) -> Result<()> {
        let text = tokio::fs::read_to_string(&self.file)
            .await
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let controller = env.controller(self.repo.context()?)?;

        // Open first so the save carries the current version token
        match controller.open(&self.path).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => controller.new_file(&self.path)?,
            Err(e) => return Err(status(Operation::Open, &self.path)(e)),
        }
        let created = controller.session().is_new_file();

        controller.set_content(text);
        let outcome = controller
            .save(self.message.as_deref())
            .await
            .map_err(status(Operation::Save, &self.path))?;

        let verb = if created { "Created" } else { "Updated" };
        println!("{} {} ({})", verb, self.path, outcome.version);
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct RmArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// File inside the repository
    pub path: String,

    /// Commit message (default: "Delete <path>")
    #[arg(long, short)]
    pub message: Option<String>,
}

impl RmArgs {
    pub async fn run(self, env: &Environment) -> Result<()> {
        let controller = env.controller(self.repo.context()?)?;
        controller
            .open(&self.path)
            .await
            .map_err(status(Operation::Open, &self.path))?;
        controller
            .delete(&self.path, self.message.as_deref())
            .await
            .map_err(status(Operation::Delete, &self.path))?;
        println!("Deleted {}", self.path);
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Only show paths containing this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,
}

impl IndexArgs {
    pub async fn run(self, env: &Environment) -> Result<()> {
        let controller = env.controller(self.repo.context()?)?;
        let index = controller.index().await?;

        for path in index.matching(self.filter.as_deref().unwrap_or("")) {
            println!("{}", path);
        }
        if index.truncated {
            eprintln!(
                "note: listing stopped early (search.max-depth = {}, search.max-files = {})",
                env.config.search.max_depth, env.config.search.max_files
            );
        }
        Ok(())
    }
}
