// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP client for a hosted repository contents API
//!
//! This crate shapes the contents requests (read, create/update with a
//! version token, delete, directory listing, repository listing), executes
//! them with a per-request deadline and a single rate-limit retry, and turns
//! non-2xx responses into [`HttpError`] values that keep the status and body
//! for the caller to interpret.
//!
//! The network sits behind the [`HttpTransport`] trait so callers and tests
//! can swap it out; the `test-support` feature exposes a scripted transport.

pub mod auth;
pub mod client;
pub mod encoding;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod transport;

pub use auth::*;
pub use client::*;
pub use encoding::{decode_text, encode_text};
pub use error::*;
pub use transport::*;
pub use url::Url;
