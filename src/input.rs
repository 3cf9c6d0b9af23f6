//! The pending-input buffer and keystroke routing.
//!
//! A plain Enter submits the buffer and is consumed, so it never inserts a
//! newline.  Shift+Enter inserts one.  Everything else edits the buffer.

/// A keystroke delivered by the front end.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// Enter, with or without Shift held.
    Enter {
        /// Whether Shift was held.
        shift: bool,
    },
    /// Delete the character before the cursor.
    Backspace,
}

/// What a keystroke means for the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    /// Submit the buffer; the keystroke's default effect is suppressed.
    Submit,
    /// Apply an edit to the buffer.
    Edit(Edit),
}

/// A change to the input buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Append a character.
    Insert(char),
    /// Remove the last character.
    Backspace,
}

impl Key {
    /// Classifies the keystroke.
    pub fn command(self) -> KeyCommand {
        match self {
            Key::Enter { shift: false } => KeyCommand::Submit,
            Key::Enter { shift: true } => KeyCommand::Edit(Edit::Insert('\n')),
            Key::Char(c) => KeyCommand::Edit(Edit::Insert(c)),
            Key::Backspace => KeyCommand::Edit(Edit::Backspace),
        }
    }
}

/// Text typed but not yet submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current text, untrimmed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True if the buffer holds no text at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True if the buffer holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Replaces the buffer's text.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Applies an edit.
    pub fn apply(&mut self, edit: Edit) {
        match edit {
            Edit::Insert(c) => self.text.push(c),
            Edit::Backspace => {
                self.text.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_submits_shift_enter_inserts() {
        assert_eq!(Key::Enter { shift: false }.command(), KeyCommand::Submit);
        assert_eq!(
            Key::Enter { shift: true }.command(),
            KeyCommand::Edit(Edit::Insert('\n'))
        );
    }

    #[test]
    fn edits() {
        let mut buffer = InputBuffer::new();
        for key in [Key::Char('h'), Key::Char('i'), Key::Enter { shift: true }, Key::Char('!')] {
            if let KeyCommand::Edit(edit) = key.command() {
                buffer.apply(edit);
            }
        }
        assert_eq!(buffer.as_str(), "hi\n!");
        buffer.apply(Edit::Backspace);
        assert_eq!(buffer.as_str(), "hi\n");
        buffer.apply(Edit::Backspace);
        buffer.apply(Edit::Backspace);
        buffer.apply(Edit::Backspace);
        buffer.apply(Edit::Backspace);
        assert!(buffer.is_empty());
    }

    #[test]
    fn blank_detection() {
        let mut buffer = InputBuffer::new();
        buffer.set(" \n\t ");
        assert!(buffer.is_blank());
        assert!(!buffer.is_empty());
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
