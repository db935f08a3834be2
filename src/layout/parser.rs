// SPDX-License-Identifier: GPL-3.0-only

//! Layout parsing logic for loading JSON layout definitions.
//!
//! This module provides functions for parsing keyboard layouts from JSON
//! files and strings, followed by validation.

use crate::layout::types::{Layout, LayoutDefinition, ParseError, ParseResult};
use crate::layout::validation::validate_layout;
use std::fs;

/// Parses a keyboard layout from a JSON file.
///
/// Distinguishes between I/O errors (file not found, permission denied)
/// and JSON errors (malformed JSON, unknown key identifiers), and attaches
/// the file path to either.
///
/// # Example
///
/// ```rust,ignore
/// use predboard::layout::parse_layout_file;
///
/// match parse_layout_file("layouts/qwerty.json") {
///     Ok(result) => {
///         for warning in &result.warnings {
///             tracing::warn!("{}", warning);
///         }
///         let layout = result.into_layout();
///     }
///     Err(e) => eprintln!("Failed to parse layout: {}", e),
/// }
/// ```
pub fn parse_layout_file(path: &str) -> Result<ParseResult<Layout>, ParseError> {
    let json_str =
        fs::read_to_string(path).map_err(|e| ParseError::io_error_with_path(e, path))?;

    let definition: LayoutDefinition =
        serde_json::from_str(&json_str).map_err(|e| ParseError::json_error_with_path(e, path))?;

    validate_layout(definition).map_err(|e| e.with_path(path))
}

/// Parses a keyboard layout from a JSON string.
pub fn parse_layout_from_string(json: &str) -> Result<ParseResult<Layout>, ParseError> {
    let definition: LayoutDefinition = serde_json::from_str(json).map_err(ParseError::json_error)?;

    validate_layout(definition)
}

// ============================================================================
// Tests
// ============================================================================
