// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Text <-> wire content encoding
//!
//! Content crosses the wire as standard base64 of the UTF-8 bytes. The host
//! chunks the blob with newlines on reads; those are stripped before decoding.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{ContentsError, Result};

/// Encode UTF-8 text for a write request
pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode a (possibly newline-chunked) base64 blob into UTF-8 text
pub fn decode_text(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ContentsError::Malformed(format!("invalid base64 content: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| ContentsError::Malformed(format!("content is not valid UTF-8: {}", e)))
}
