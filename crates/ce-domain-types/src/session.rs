// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Session state types shared with the rendering layer

use serde::{Deserialize, Serialize};

/// Progress of a load or save: `idle -> loading -> {loaded | error}`
///
/// `Loading` may be re-entered from any state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

impl LoadState {
    pub fn is_in_flight(self) -> bool {
        matches!(self, LoadState::Loading)
    }
}
