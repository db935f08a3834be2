// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard layout model.
//!
//! A layout is an ordered list of rows, each an ordered list of keys. Keys
//! are literal characters (letters, digits, punctuation) or the symbolic
//! actions `SPACE`, `BACKSPACE`, `ENTER` and `SHIFT`. Every identifier is
//! unique and the layout is immutable once built; sessions share it behind
//! an `Arc`.
//!
//! # Example Usage
//!
//! ## Built-in Layout
//!
//! ```rust,ignore
//! use predboard::layout::{KeyId, Layout};
//!
//! let layout = Layout::qwerty();
//! assert!(layout.contains(&KeyId::Char('Q')));
//! ```
//!
//! ## Parsing from JSON
//!
//! ```rust,ignore
//! use predboard::layout::parse_layout_from_string;
//!
//! let json = r#"{
//!     "name": "Tiny",
//!     "rows": [
//!         { "keys": [ { "id": "a" }, { "id": "b" } ] },
//!         { "keys": [ { "id": "SPACE", "width": "double" }, { "id": "BACKSPACE" } ] }
//!     ]
//! }"#;
//!
//! let result = parse_layout_from_string(json)?;
//! for warning in &result.warnings {
//!     println!("{}", warning);
//! }
//! ```
//!
//! ## Error Handling
//!
//! Non-fatal issues (missing labels, empty rows) come back as warnings in
//! the `ParseResult`. Unknown key identifiers and malformed JSON return
//! `ParseError::JsonError`; duplicate keys return
//! `ParseError::ValidationError`.

pub mod parser;
pub mod types;
pub mod validation;

// Re-export public API - Error handling types
pub use types::{ParseError, ParseResult, Severity, ValidationIssue};

// Re-export public API - Parser functions
pub use parser::{parse_layout_file, parse_layout_from_string};

// Re-export public API - Data structures
pub use types::{
    Key, KeyDefinition, KeyId, KeyIdError, Layout, LayoutDefinition, Row, RowDefinition,
    WidthClass,
};
