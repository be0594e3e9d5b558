//! Single-line text input (pure state transitions).
//!
//! Backs both the search box and the inline-edit buffer. The cursor is a
//! character index, so multi-byte input never splits a code point.
//! All functions are pure - no side effects, testable without TUI.

/// Text plus cursor position.
///
/// # Invariants
/// - `cursor <= text.chars().count()`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    /// Input holding `text` with the cursor at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Consume into the text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// True when the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(offset, _)| offset)
    }
}

/// Insert a character at the cursor and advance it.
pub fn handle_char_input(mut input: TextInput, ch: char) -> TextInput {
    let at = input.byte_offset(input.cursor);
    input.text.insert(at, ch);
    input.cursor += 1;
    input
}

/// Delete the character before the cursor. No-op at position 0.
pub fn handle_backspace(mut input: TextInput) -> TextInput {
    if input.cursor > 0 {
        let at = input.byte_offset(input.cursor - 1);
        input.text.remove(at);
        input.cursor -= 1;
    }
    input
}

/// Delete the character under the cursor. No-op at the end.
pub fn handle_delete(mut input: TextInput) -> TextInput {
    if input.cursor < input.char_count() {
        let at = input.byte_offset(input.cursor);
        input.text.remove(at);
    }
    input
}

/// Move cursor left by one position. Saturates at 0.
pub fn handle_cursor_left(mut input: TextInput) -> TextInput {
    input.cursor = input.cursor.saturating_sub(1);
    input
}

/// Move cursor right by one position. Saturates at the text length.
pub fn handle_cursor_right(mut input: TextInput) -> TextInput {
    input.cursor = (input.cursor + 1).min(input.char_count());
    input
}

/// Move cursor to the start.
pub fn handle_home(mut input: TextInput) -> TextInput {
    input.cursor = 0;
    input
}

/// Move cursor to the end.
pub fn handle_end(mut input: TextInput) -> TextInput {
    input.cursor = input.char_count();
    input
}

// ===== Tests =====

#[cfg(test)]
#[path = "text_input_tests.rs"]
mod tests;
