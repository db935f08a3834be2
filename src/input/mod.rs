// SPDX-License-Identifier: GPL-3.0-only

//! Input handling for predboard.
//!
//! This module interprets key activations as edits of the session's text
//! buffer.
//!
//! # Features
//!
//! - **Text buffer**: append, delete-last and whole-word insertion
//! - **Shift state**: one-shot upper-case for the next letter
//! - **Input controller**: maps each `KeyId` to one buffer transition
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use predboard::input::{InputController, InputEffect};
//! use predboard::layout::KeyId;
//!
//! let mut input = InputController::new();
//! input.activate(&KeyId::Shift);
//! let effect = input.activate(&KeyId::Char('A'));
//!
//! assert_eq!(effect, InputEffect::Inserted('A'));
//! if effect.changed_text() {
//!     // Request a new prediction for input.text()
//! }
//! ```

pub mod buffer;
pub mod controller;
pub mod shift;

pub use buffer::TextBuffer;
pub use controller::{InputController, InputEffect};
pub use shift::ShiftState;
