// SPDX-License-Identifier: GPL-3.0-only

//! Core data types for keyboard layouts.
//!
//! This module defines the key identifiers shared by every other component,
//! the immutable `Layout` consumed by the size resolver and the animation
//! controller, the serde definitions used by the JSON parser, and the error
//! types reported while loading a layout.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Error Handling Types
// ============================================================================

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal error that prevents layout from being used
    Error,
    /// Non-fatal issue that should be addressed
    Warning,
}

/// A validation issue discovered during layout parsing.
///
/// Contains the severity, the path of the offending field and an optional
/// suggestion for fixing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity level (Error or Warning)
    pub severity: Severity,
    /// Human-readable description of the issue
    pub message: String,
    /// Path to the field that caused the issue (e.g., "rows[1].keys[2]")
    pub field_path: String,
    /// Optional suggestion for how to fix the issue
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            field_path: field_path.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to the validation issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity_str = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };

        write!(f, "[{}] {}: {}", severity_str, self.field_path, self.message)?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

/// Error type for layout parsing operations.
#[derive(Debug)]
pub enum ParseError {
    /// I/O error occurred while reading layout file
    IoError {
        /// The underlying I/O error
        source: std::io::Error,
        /// Optional file path that caused the error
        file_path: Option<String>,
    },

    /// JSON parsing error, including unknown key identifiers
    JsonError {
        /// The underlying JSON parsing error
        source: serde_json::Error,
        /// Optional file path being parsed
        file_path: Option<String>,
        /// Line number where the error occurred (from serde_json)
        line_number: Option<usize>,
    },

    /// Fatal validation errors found during parsing
    ValidationError {
        /// List of validation issues found
        issues: Vec<ValidationIssue>,
        /// Optional file path being validated
        file_path: Option<String>,
    },
}

impl ParseError {
    /// Creates an I/O error with file path.
    pub fn io_error_with_path(source: std::io::Error, file_path: impl Into<String>) -> Self {
        Self::IoError {
            source,
            file_path: Some(file_path.into()),
        }
    }

    /// Creates a JSON parsing error with context.
    pub fn json_error(source: serde_json::Error) -> Self {
        let line_number = source.line().into();
        Self::JsonError {
            source,
            file_path: None,
            line_number,
        }
    }

    /// Creates a JSON parsing error with file path.
    pub fn json_error_with_path(source: serde_json::Error, file_path: impl Into<String>) -> Self {
        let line_number = source.line().into();
        Self::JsonError {
            source,
            file_path: Some(file_path.into()),
            line_number,
        }
    }

    /// Creates a validation error from a list of issues.
    pub fn validation_error(issues: Vec<ValidationIssue>) -> Self {
        Self::ValidationError {
            issues,
            file_path: None,
        }
    }

    /// Attaches a file path to an error that does not carry one yet.
    pub fn with_path(self, path: &str) -> Self {
        match self {
            ParseError::ValidationError {
                issues,
                file_path: None,
            } => ParseError::ValidationError {
                issues,
                file_path: Some(path.to_string()),
            },
            ParseError::JsonError {
                source,
                file_path: None,
                line_number,
            } => ParseError::JsonError {
                source,
                file_path: Some(path.to_string()),
                line_number,
            },
            other => other,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::IoError { source, file_path } => {
                write!(f, "I/O error")?;
                if let Some(path) = file_path {
                    write!(f, " reading file '{}'", path)?;
                }
                write!(f, ": {}", source)?;
            }
            ParseError::JsonError {
                source,
                file_path,
                line_number,
            } => {
                write!(f, "JSON parsing error")?;
                if let Some(path) = file_path {
                    write!(f, " in file '{}'", path)?;
                }
                if let Some(line) = line_number {
                    write!(f, " at line {}", line)?;
                }
                write!(f, ": {}", source)?;
            }
            ParseError::ValidationError { issues, file_path } => {
                write!(f, "Validation failed")?;
                if let Some(path) = file_path {
                    write!(f, " for file '{}'", path)?;
                }
                writeln!(f, " with {} issue(s):", issues.len())?;
                for (i, issue) in issues.iter().enumerate() {
                    write!(f, "  {}. {}", i + 1, issue)?;
                    if i < issues.len() - 1 {
                        writeln!(f)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::IoError { source, .. } => Some(source),
            ParseError::JsonError { source, .. } => Some(source),
            ParseError::ValidationError { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::json_error(err)
    }
}

// ============================================================================
// ParseResult Type
// ============================================================================

/// Result of successfully parsing a layout with optional warnings.
///
/// The parser is permissive: a usable layout is returned even when
/// non-fatal issues were found and defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult<T> {
    /// The successfully parsed layout
    pub layout: T,
    /// Non-fatal validation warnings
    pub warnings: Vec<ValidationIssue>,
}

impl<T> ParseResult<T> {
    /// Creates a new parse result with warnings.
    pub fn with_warnings(layout: T, warnings: Vec<ValidationIssue>) -> Self {
        Self { layout, warnings }
    }

    /// Returns true if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Consumes the result and returns the layout, discarding warnings.
    pub fn into_layout(self) -> T {
        self.layout
    }
}

// ============================================================================
// Key Identifiers
// ============================================================================

/// Identity of one key on the keyboard.
///
/// Letters are always stored upper-case so that `"r"` and `"R"` coming from
/// the prediction service address the same key. Digits and punctuation are
/// stored as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyId {
    /// A literal character key
    Char(char),
    /// The space bar
    Space,
    /// Delete the last character
    Backspace,
    /// Insert a newline
    Enter,
    /// One-shot upper-case toggle
    Shift,
}

impl KeyId {
    /// Creates a character key, normalizing letters to upper-case.
    ///
    /// Returns `None` for characters that cannot appear on the keyboard.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ' ' => Some(KeyId::Space),
            '\n' => Some(KeyId::Enter),
            c if c.is_ascii_alphabetic() => Some(KeyId::Char(c.to_ascii_uppercase())),
            c if c.is_ascii_digit() || c.is_ascii_punctuation() => Some(KeyId::Char(c)),
            _ => None,
        }
    }

    /// Returns the label shown on the key when the layout does not set one.
    pub fn natural_label(&self) -> String {
        match self {
            KeyId::Char(c) => c.to_ascii_lowercase().to_string(),
            KeyId::Space => "space".to_string(),
            KeyId::Backspace => "backspace".to_string(),
            KeyId::Enter => "enter".to_string(),
            KeyId::Shift => "shift".to_string(),
        }
    }
}

/// Error returned when a string does not name a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIdError {
    /// The rejected input
    pub input: String,
}

impl fmt::Display for KeyIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a key identifier (expected a single letter, digit, \
             punctuation mark, SPACE, BACKSPACE, ENTER or SHIFT)",
            self.input
        )
    }
}

impl std::error::Error for KeyIdError {}

impl FromStr for KeyId {
    type Err = KeyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return KeyId::from_char(c).ok_or_else(|| KeyIdError {
                input: s.to_string(),
            });
        }

        match s.to_ascii_uppercase().as_str() {
            "SPACE" => Ok(KeyId::Space),
            "BACKSPACE" => Ok(KeyId::Backspace),
            "ENTER" => Ok(KeyId::Enter),
            "SHIFT" => Ok(KeyId::Shift),
            _ => Err(KeyIdError {
                input: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for KeyId {
    type Error = KeyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Char(c) => write!(f, "{}", c),
            KeyId::Space => write!(f, "SPACE"),
            KeyId::Backspace => write!(f, "BACKSPACE"),
            KeyId::Enter => write!(f, "ENTER"),
            KeyId::Shift => write!(f, "SHIFT"),
        }
    }
}

// ============================================================================
// Layout Data Structures
// ============================================================================

/// Horizontal weight class of a key before any prediction is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthClass {
    /// One unit wide
    #[default]
    Standard,
    /// One and a half units wide
    Wide,
    /// Two units wide (the space bar)
    Double,
}

impl WidthClass {
    /// Returns the flex weight for this class.
    pub fn weight(&self) -> f32 {
        match self {
            WidthClass::Standard => 1.0,
            WidthClass::Wide => 1.5,
            WidthClass::Double => 2.0,
        }
    }
}

/// A keyboard key definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Identity of the key
    pub id: KeyId,
    /// Display label shown on the key
    pub label: String,
    /// Default width weight
    pub width: WidthClass,
}

impl Key {
    /// Creates a standard-width key with its natural label.
    pub fn new(id: KeyId) -> Self {
        Self {
            id,
            label: id.natural_label(),
            width: WidthClass::Standard,
        }
    }

    /// Overrides the width class.
    pub fn with_width(mut self, width: WidthClass) -> Self {
        self.width = width;
        self
    }

    /// Overrides the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// A row of keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Keys in this row, left to right
    pub keys: Vec<Key>,
}

impl Row {
    /// Creates a row of standard keys from a string of characters.
    pub fn from_chars(chars: &str) -> Self {
        Self {
            keys: chars
                .chars()
                .filter_map(KeyId::from_char)
                .map(Key::new)
                .collect(),
        }
    }

    /// Appends a key to the row.
    pub fn push(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Prepends a key to the row.
    pub fn prepend(mut self, key: Key) -> Self {
        self.keys.insert(0, key);
        self
    }
}

/// A complete, validated keyboard layout.
///
/// Every key identifier is unique. The layout cannot be modified after
/// construction; build a new one instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    name: String,
    rows: Vec<Row>,
    /// Position of each key as (row, column)
    index: HashMap<KeyId, (usize, usize)>,
}

impl Layout {
    /// Creates a layout, rejecting duplicate key identifiers.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::ValidationError` listing every duplicate.
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Result<Self, ParseError> {
        let mut seen: HashMap<KeyId, (usize, usize)> = HashMap::new();
        let mut issues = Vec::new();

        for (row_idx, row) in rows.iter().enumerate() {
            for (key_idx, key) in row.keys.iter().enumerate() {
                if let Some((first_row, first_key)) = seen.get(&key.id) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Error,
                            format!(
                                "Duplicate key '{}' (first defined at rows[{}].keys[{}])",
                                key.id, first_row, first_key
                            ),
                            format!("rows[{}].keys[{}]", row_idx, key_idx),
                        )
                        .with_suggestion("Every key may appear only once in a layout"),
                    );
                } else {
                    seen.insert(key.id, (row_idx, key_idx));
                }
            }
        }

        if !issues.is_empty() {
            return Err(ParseError::validation_error(issues));
        }

        Ok(Self {
            name: name.into(),
            rows,
            index: seen,
        })
    }

    /// Returns the built-in QWERTY layout.
    ///
    /// The bottom row holds only the space bar and backspace so that they
    /// split it 2:1 before any prediction has run.
    pub fn qwerty() -> Self {
        let rows = vec![
            Row::from_chars("1234567890"),
            Row::from_chars("qwertyuiop"),
            Row::from_chars("asdfghjkl").push(Key::new(KeyId::Enter)),
            Row::from_chars("zxcvbnm,.?!").prepend(Key::new(KeyId::Shift)),
            Row::default()
                .push(Key::new(KeyId::Space).with_width(WidthClass::Double))
                .push(Key::new(KeyId::Backspace)),
        ];

        let mut index = HashMap::new();
        for (row_idx, row) in rows.iter().enumerate() {
            for (key_idx, key) in row.keys.iter().enumerate() {
                index.insert(key.id, (row_idx, key_idx));
            }
        }

        Self {
            name: "QWERTY".to_string(),
            rows,
            index,
        }
    }

    /// Returns the layout name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rows in display order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Iterates over every key, row by row.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.rows.iter().flat_map(|row| row.keys.iter())
    }

    /// Returns the number of keys in the layout.
    pub fn key_count(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the layout contains the key.
    pub fn contains(&self, id: &KeyId) -> bool {
        self.index.contains_key(id)
    }

    /// Looks up a key by identifier.
    pub fn key(&self, id: &KeyId) -> Option<&Key> {
        let (row, col) = self.index.get(id)?;
        self.rows.get(*row)?.keys.get(*col)
    }

    /// Returns the row index of a key.
    pub fn row_of(&self, id: &KeyId) -> Option<usize> {
        self.index.get(id).map(|(row, _)| *row)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::qwerty()
    }
}

// ============================================================================
// JSON Definitions
// ============================================================================

/// Serialized form of a key inside a layout file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDefinition {
    /// Key identifier (e.g. "q", "SPACE")
    pub id: KeyId,

    /// Display label; defaults to the key's natural label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Width class
    #[serde(default)]
    pub width: WidthClass,
}

/// Serialized form of a row inside a layout file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowDefinition {
    /// Keys in this row
    #[serde(default)]
    pub keys: Vec<KeyDefinition>,
}

/// Serialized form of a complete layout file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDefinition {
    /// Layout name
    #[serde(default)]
    pub name: String,

    /// Rows of keys
    #[serde(default)]
    pub rows: Vec<RowDefinition>,
}

// ============================================================================
// Tests
// ============================================================================
