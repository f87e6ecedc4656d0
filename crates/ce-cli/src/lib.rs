// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use ce_logging::CliLoggingArgs;
use clap::Subcommand;
use std::path::PathBuf;

pub mod account;
pub mod environment;
pub mod files;
pub mod history;

pub use environment::Environment;

#[derive(clap::Parser)]
#[command(
    name = "ce",
    about = "Edit files of a remote repository without a local clone",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Bearer credential for the contents API
    #[arg(long, env = "CE_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Extra configuration file, above the user and system files
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override a configuration value, e.g. `--set transport.timeout-ms=5000`
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub set: Vec<String>,

    #[command(flatten)]
    pub logging: CliLoggingArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the identity behind the credential
    Whoami(account::WhoamiArgs),
    /// List repositories you can push to
    Repos(account::ReposArgs),
    /// List a directory
    Ls(files::LsArgs),
    /// Print a file
    Cat(files::CatArgs),
    /// Upload a local file, creating or updating the remote one
    Put(files::PutArgs),
    /// Delete a file
    Rm(files::RmArgs),
    /// List the files of a repository, optionally filtered
    Index(files::IndexArgs),
    /// Show recently opened files
    Recent(history::RecentArgs),
    /// Pin a repository
    Pin(history::PinArgs),
    /// Unpin a repository
    Unpin(history::PinArgs),
    /// Show pinned repositories
    Pins,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let env = Environment::load(self.config, &self.set, self.token)?;

        match self.command {
            Commands::Whoami(args) => args.run(&env).await,
            Commands::Repos(args) => args.run(&env).await,
            Commands::Ls(args) => args.run(&env).await,
            Commands::Cat(args) => args.run(&env).await,
            Commands::Put(args) => args.run(&env).await,
            Commands::Rm(args) => args.run(&env).await,
            Commands::Index(args) => args.run(&env).await,
            Commands::Recent(args) => args.run(&env).await,
            Commands::Pin(args) => args.pin(&env).await,
            Commands::Unpin(args) => args.unpin(&env).await,
            Commands::Pins => history::list_pins(&env).await,
        }
    }
}

pub use clap::Parser;
