// SPDX-License-Identifier: GPL-3.0-only

//! One-shot shift state.
//!
//! Tapping SHIFT toggles it; the next letter consumes it and any other
//! activation clears it.
//!
//! # Example
//!
//! ```rust,ignore
//! use predboard::input::ShiftState;
//!
//! let mut shift = ShiftState::new();
//! shift.toggle();
//! assert!(shift.consume());
//! assert!(!shift.is_active());
//! ```

/// Tracks whether the next letter is upper-case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftState {
    active: bool,
}

impl ShiftState {
    /// Creates an inactive shift state.
    #[must_use]
    pub fn new() -> Self {
        Self { active: false }
    }

    /// Toggles shift.
    ///
    /// # Returns
    ///
    /// `true` if shift is now active
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    /// Checks if shift is currently active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether shift was active and clears it.
    ///
    /// Used when a letter is typed, to pick its case.
    pub fn consume(&mut self) -> bool {
        std::mem::take(&mut self.active)
    }

    /// Clears shift without reading it.
    pub fn clear(&mut self) {
        self.active = false;
    }
}
