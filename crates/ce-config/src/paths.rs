// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration file path discovery

use std::path::PathBuf;

/// Directory name used under the platform config/data directories
pub const APP_DIR: &str = "contents-editor";
/// Overrides the user config and data directories
pub const HOME_ENV: &str = "CE_HOME";

/// Configuration file paths for the different scopes
#[derive(Debug, Clone)]
pub struct Paths {
    pub system: PathBuf,
    pub user: PathBuf,
    pub cli_config: Option<PathBuf>,
}

impl Paths {
    pub fn with_cli_config(mut self, path: Option<PathBuf>) -> Self {
        self.cli_config = path;
        self
    }
}

/// Discover configuration file paths for the current environment
pub fn discover_paths() -> Paths {
    Paths {
        system: system_config_path(),
        user: user_config_path(),
        cli_config: None,
    }
}

/// `CE_HOME`, when set to a non-empty value
pub fn ce_home() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn system_config_path() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Library/Application Support").join(APP_DIR).join("config.toml")
    } else if cfg!(target_os = "windows") {
        PathBuf::from(std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".into()))
            .join(APP_DIR)
            .join("config.toml")
    } else {
        PathBuf::from("/etc").join(APP_DIR).join("config.toml")
    }
}

fn user_config_path() -> PathBuf {
    if let Some(home) = ce_home() {
        return home.join("config.toml");
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join(APP_DIR)
        .join("config.toml")
}
