// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Environment variable and flag overlays

use anyhow::Result;
use serde_json::Value as J;
use std::collections::HashMap;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "CE";

/// Create JSON overlay from the process's `CE_*` environment variables
pub fn env_overlay() -> Result<J> {
    build_env_overlay(None)
}

/// Same as [`env_overlay`] but reading from an explicit variable map
pub fn env_overlay_from(vars: HashMap<String, String>) -> Result<J> {
    build_env_overlay(Some(vars))
}

fn build_env_overlay(source: Option<HashMap<String, String>>) -> Result<J> {
    // CE_TRANSPORT__TIMEOUT_MS -> transport.timeout_ms
    let built = config::Config::builder()
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(source),
        )
        .build()?;

    let raw = serde_json::to_value(built.try_deserialize::<serde_json::Map<String, J>>()?)?;

    // Only nested keys are configuration; CE_HOME and CE_TOKEN are not
    let mut sections = serde_json::Map::new();
    if let J::Object(map) = raw {
        for (k, v) in map {
            if v.is_object() {
                sections.insert(kebab(&k), kebab_keys(v));
            }
        }
    }
    Ok(J::Object(sections))
}

fn kebab(key: &str) -> String {
    key.to_ascii_lowercase().replace('_', "-")
}

fn kebab_keys(v: J) -> J {
    match v {
        J::Object(map) => J::Object(map.into_iter().map(|(k, v)| (kebab(&k), kebab_keys(v))).collect()),
        other => other,
    }
}

/// Create JSON overlay from CLI flag key=value pairs
///
/// Integers and booleans keep their type; everything else is a string.
pub fn flags_overlay(kv_pairs: &[(&str, &str)]) -> J {
    let mut root = serde_json::json!({});
    for (k, v) in kv_pairs {
        crate::merge::insert_dotted(&mut root, k, parse_flag_value(v));
    }
    root
}

/// Split `key=value` flags as given on the command line
pub fn parse_set_flags(flags: &[String]) -> Result<Vec<(String, String)>> {
    flags
        .iter()
        .map(|flag| {
            flag.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| anyhow::anyhow!("invalid --set flag {:?}, expected key=value", flag))
        })
        .collect()
}

fn parse_flag_value(raw: &str) -> J {
    if let Ok(b) = raw.parse::<bool>() {
        return J::Bool(b);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return J::from(n);
    }
    J::String(raw.to_string())
}
