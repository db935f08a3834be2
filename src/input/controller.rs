// SPDX-License-Identifier: GPL-3.0-only

//! Key activation handling.
//!
//! The `InputController` owns the text buffer and the shift state and turns
//! each key activation into exactly one of the transitions below:
//!
//! | Activation  | Effect                                            |
//! |-------------|---------------------------------------------------|
//! | letter      | append lower-case, or upper-case if shift is on   |
//! | digit/punct | append the literal character                      |
//! | SPACE       | append `' '`                                      |
//! | ENTER       | append `'\n'`                                     |
//! | BACKSPACE   | remove the last character (no-op when empty)      |
//! | SHIFT       | toggle shift, buffer untouched                    |
//!
//! Every activation other than SHIFT clears shift.

use crate::input::buffer::TextBuffer;
use crate::input::shift::ShiftState;
use crate::layout::KeyId;

/// Outcome of a key activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEffect {
    /// A character was appended
    Inserted(char),
    /// The last character was removed
    Deleted(char),
    /// Backspace on an empty buffer
    Unchanged,
    /// Shift was toggled to the given state
    ShiftToggled(bool),
}

impl InputEffect {
    /// Returns `true` if the text buffer changed.
    ///
    /// Only buffer changes start a new prediction cycle.
    pub fn changed_text(&self) -> bool {
        matches!(self, InputEffect::Inserted(_) | InputEffect::Deleted(_))
    }
}

/// Interprets key activations for one keyboard session.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    buffer: TextBuffer,
    shift: ShiftState,
}

impl InputController {
    /// Creates a controller with an empty buffer and shift off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a controller starting from existing text.
    pub fn with_text(text: &str) -> Self {
        Self {
            buffer: TextBuffer::from(text),
            shift: ShiftState::new(),
        }
    }

    /// Returns the text typed so far.
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// Returns `true` if the next letter will be upper-case.
    pub fn shift_active(&self) -> bool {
        self.shift.is_active()
    }

    /// Applies one key activation.
    pub fn activate(&mut self, key: &KeyId) -> InputEffect {
        let effect = match key {
            KeyId::Shift => return InputEffect::ShiftToggled(self.shift.toggle()),
            KeyId::Backspace => match self.buffer.pop() {
                Some(removed) => InputEffect::Deleted(removed),
                None => InputEffect::Unchanged,
            },
            KeyId::Space => self.insert(' '),
            KeyId::Enter => self.insert('\n'),
            KeyId::Char(c) if c.is_ascii_alphabetic() => {
                let c = if self.shift.consume() {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                };
                self.insert(c)
            }
            KeyId::Char(c) => self.insert(*c),
        };

        self.shift.clear();
        tracing::trace!("{} -> {:?}", key, effect);
        effect
    }

    /// Appends a whole word followed by a space.
    ///
    /// A separating space is inserted first when the buffer does not
    /// already end at a word start. Blank words are ignored.
    ///
    /// # Returns
    ///
    /// `true` if the buffer changed
    pub fn insert_word(&mut self, word: &str) -> bool {
        let word = word.trim();
        if word.is_empty() {
            return false;
        }

        if !self.buffer.at_word_start() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(word);
        self.buffer.push(' ');
        self.shift.clear();
        true
    }

    /// Empties the buffer and clears shift.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.shift.clear();
    }

    fn insert(&mut self, c: char) -> InputEffect {
        self.buffer.push(c);
        InputEffect::Inserted(c)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn press(controller: &mut InputController, keys: &str) {
        for c in keys.chars() {
            let key = KeyId::from_char(c).unwrap();
            controller.activate(&key);
        }
    }

    /// Test 1: Backspace removes the last character
    #[test]
    fn test_backspace() {
        let mut controller = InputController::with_text("cat");
        assert_eq!(controller.activate(&KeyId::Backspace), InputEffect::Deleted('t'));
        assert_eq!(controller.text(), "ca");

        controller.activate(&KeyId::Space);
        press(&mut controller, "t");
        assert_eq!(controller.text(), "ca t");
    }

    /// Test 2: Backspace on an empty buffer is a no-op
    #[test]
    fn test_backspace_on_empty() {
        let mut controller = InputController::new();
        let effect = controller.activate(&KeyId::Backspace);
        assert_eq!(effect, InputEffect::Unchanged);
        assert!(!effect.changed_text());
        assert_eq!(controller.text(), "");
    }

    /// Test 3: Shift is one-shot
    #[test]
    fn test_shift_then_letter() {
        let mut controller = InputController::new();

        assert_eq!(controller.activate(&KeyId::Shift), InputEffect::ShiftToggled(true));
        assert_eq!(controller.text(), "");
        assert_eq!(controller.activate(&KeyId::Char('A')), InputEffect::Inserted('A'));
        assert!(!controller.shift_active());

        controller.activate(&KeyId::Char('A'));
        assert_eq!(controller.text(), "Aa");
    }

    /// Test 4: Tapping shift twice turns it off again
    #[test]
    fn test_shift_retap() {
        let mut controller = InputController::new();
        controller.activate(&KeyId::Shift);
        assert_eq!(controller.activate(&KeyId::Shift), InputEffect::ShiftToggled(false));
        press(&mut controller, "b");
        assert_eq!(controller.text(), "b");
    }

    /// Test 5: Every non-shift activation clears shift
    #[test]
    fn test_non_letters_clear_shift() {
        let keys = [
            KeyId::Space,
            KeyId::Enter,
            KeyId::Backspace,
            KeyId::Char('1'),
            KeyId::Char('?'),
        ];
        for key in keys {
            let mut controller = InputController::new();
            controller.activate(&KeyId::Shift);
            controller.activate(&key);
            assert!(!controller.shift_active(), "{} should clear shift", key);
        }
    }

    /// Test 6: Space, enter and punctuation append literally
    #[test]
    fn test_literal_keys() {
        let mut controller = InputController::new();
        press(&mut controller, "hi,");
        controller.activate(&KeyId::Space);
        press(&mut controller, "yo!");
        controller.activate(&KeyId::Enter);
        assert_eq!(controller.text(), "hi, yo!\n");
    }

    /// Test 7: Only buffer changes count as text changes
    #[test]
    fn test_changed_text() {
        assert!(InputEffect::Inserted('a').changed_text());
        assert!(InputEffect::Deleted('a').changed_text());
        assert!(!InputEffect::ShiftToggled(true).changed_text());
        assert!(!InputEffect::Unchanged.changed_text());
    }

    /// Test 8: Whole words are appended with separating spaces
    #[test]
    fn test_insert_word() {
        let mut controller = InputController::new();
        assert!(controller.insert_word("I"));
        assert_eq!(controller.text(), "I ");

        press(&mut controller, "am");
        controller.activate(&KeyId::Shift);
        assert!(controller.insert_word(" hungry "));
        assert_eq!(controller.text(), "I am hungry ");
        assert!(!controller.shift_active());

        assert!(!controller.insert_word("   "));
        assert_eq!(controller.text(), "I am hungry ");
    }

    #[test]
    fn test_clear() {
        let mut controller = InputController::with_text("abc");
        controller.activate(&KeyId::Shift);
        controller.clear();
        assert_eq!(controller.text(), "");
        assert!(!controller.shift_active());
    }
}
