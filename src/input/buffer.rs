// SPDX-License-Identifier: GPL-3.0-only

//! The text typed so far.

use std::fmt;

/// Append-only text buffer with delete-last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a character.
    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    /// Appends a string.
    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Removes and returns the last character, if any.
    pub fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    /// Returns the last character, if any.
    pub fn last(&self) -> Option<char> {
        self.text.chars().last()
    }

    /// Returns `true` if the buffer is empty or ends in whitespace.
    pub fn at_word_start(&self) -> bool {
        self.last().is_none_or(char::is_whitespace)
    }

    /// Returns the buffer contents.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns `true` if nothing has been typed.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
