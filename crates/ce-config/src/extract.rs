// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed extraction from the merged configuration

use serde::de::DeserializeOwned;
use serde_json::Value as J;

/// Extract the entire root configuration as a typed value
pub fn get<T: DeserializeOwned>(root: &J) -> anyhow::Result<T> {
    serde_path_to_error::deserialize(root.clone())
        .map_err(|e| anyhow::anyhow!("Root extraction failed at '{}': {}", e.path(), e.inner()))
}

/// Extract a subsection of configuration at a dotted path
pub fn get_at<T: DeserializeOwned>(root: &J, dotted: &str) -> anyhow::Result<T> {
    let cur = lookup(root, dotted).ok_or_else(|| anyhow::anyhow!("missing path: {}", dotted))?;
    serde_path_to_error::deserialize(cur.clone())
        .map_err(|e| anyhow::anyhow!("Path '{}' extraction failed: {}", dotted, e))
}

/// Like [`get_at`], falling back to `T::default()` when the section is absent
pub fn get_at_or_default<T: DeserializeOwned + Default>(root: &J, dotted: &str) -> anyhow::Result<T> {
    match lookup(root, dotted) {
        Some(_) => get_at(root, dotted),
        None => Ok(T::default()),
    }
}

fn lookup<'a>(root: &'a J, dotted: &str) -> Option<&'a J> {
    dotted.split('.').try_fold(root, |cur, p| cur.get(p))
}
