// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layered configuration for the contents editor.
//!
//! Layers are loaded as TOML, converted to JSON, validated against the schema
//! generated from [`Config`], deep-merged in precedence order and finally
//! extracted into typed sections.

pub mod env;
pub mod extract;
pub mod loader;
pub mod merge;
pub mod paths;
pub mod schema;

pub use loader::Scope;
pub use schema::*;

use anyhow::Result;
use serde_json::Value as J;

/// Final merged configuration
#[derive(Debug)]
pub struct Resolved {
    /// Final merged JSON configuration
    pub json: J,
    /// Scopes that contributed at least one value, lowest precedence first
    pub contributors: Vec<Scope>,
}

impl Resolved {
    /// Typed view of the whole configuration
    pub fn config(&self) -> Result<Config> {
        extract::get(&self.json)
    }
}

/// Load and merge all configuration layers according to precedence rules
///
/// Precedence order: system < user < env < cli-config < flags
pub fn load_all(paths: &paths::Paths, flag_sets: &[(&str, &str)]) -> Result<Resolved> {
    load_with_env(paths, env::env_overlay()?, flag_sets)
}

/// [`load_all`] with an explicit environment layer
pub fn load_with_env(paths: &paths::Paths, env_layer: J, flag_sets: &[(&str, &str)]) -> Result<Resolved> {
    use Scope::*;

    let system_layer = read_optional(&paths.system, System)?;
    let user_layer = read_optional(&paths.user, User)?;
    let cli_config_layer = match &paths.cli_config {
        // An explicitly named file must exist
        Some(path) => Some(loader::read_layer_from_file(path, CliConfig)?.json),
        None => None,
    };
    let flags_layer = env::flags_overlay(flag_sets);

    let layers = [
        (system_layer, System),
        (user_layer, User),
        (Some(env_layer), Env),
        (cli_config_layer, CliConfig),
        (Some(flags_layer), Flags),
    ];

    let mut json = serde_json::json!({});
    let mut contributors = Vec::new();
    for (layer, scope) in layers {
        let Some(layer) = layer else {
            continue;
        };
        if layer.as_object().is_some_and(|m| !m.is_empty()) {
            contributors.push(scope);
        }
        merge::merge_two_json(&mut json, layer);
    }

    Ok(Resolved { json, contributors })
}

/// Missing files are skipped; present but invalid files are errors
fn read_optional(path: &std::path::Path, scope: Scope) -> Result<Option<J>> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(loader::read_layer_from_file(path, scope)?.json))
}
