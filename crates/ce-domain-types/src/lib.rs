// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for the contents editor
//!
//! This crate contains the value types that are shared between the remote
//! contents client, the editor core and the command-line harness: repository
//! coordinates, version tokens, directory entries, session states and the
//! persisted history records.
//!
//! These types carry no behaviour beyond small helpers and should stay
//! independent of any transport or UI.

pub mod contents;
pub mod history;
pub mod repository;
pub mod session;

// Re-export commonly used types
pub use contents::*;
pub use history::*;
pub use repository::*;
pub use session::*;
