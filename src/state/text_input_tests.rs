//! Tests for text input transitions.

use super::*;

fn at(text: &str, cursor: usize) -> TextInput {
    let mut input = TextInput::new(text);
    input.cursor = cursor;
    input
}

// ===== construction =====

#[test]
fn new_places_cursor_at_end() {
    let input = TextInput::new("hello");
    assert_eq!(input.cursor(), 5);
    assert_eq!(input.text(), "hello");
}

#[test]
fn new_counts_characters_not_bytes() {
    assert_eq!(TextInput::new("héllo").cursor(), 5);
}

#[test]
fn default_is_empty() {
    let input = TextInput::default();
    assert!(input.is_empty());
    assert_eq!(input.cursor(), 0);
}

// ===== handle_char_input =====

#[test]
fn char_input_appends_at_end() {
    let result = handle_char_input(TextInput::new("ab"), 'c');
    assert_eq!(result.text(), "abc");
    assert_eq!(result.cursor(), 3);
}

#[test]
fn char_input_inserts_at_cursor() {
    let result = handle_char_input(at("ac", 1), 'b');
    assert_eq!(result.text(), "abc");
    assert_eq!(result.cursor(), 2);
}

#[test]
fn char_input_after_multibyte_character() {
    let result = handle_char_input(at("é", 1), 'x');
    assert_eq!(result.text(), "éx");
}

// ===== handle_backspace =====

#[test]
fn backspace_deletes_before_cursor() {
    let result = handle_backspace(at("abc", 2));
    assert_eq!(result.text(), "ac");
    assert_eq!(result.cursor(), 1);
}

#[test]
fn backspace_at_start_is_noop() {
    let result = handle_backspace(at("abc", 0));
    assert_eq!(result.text(), "abc");
    assert_eq!(result.cursor(), 0);
}

#[test]
fn backspace_removes_whole_multibyte_character() {
    let result = handle_backspace(TextInput::new("caf\u{e9}"));
    assert_eq!(result.text(), "caf");
}

// ===== handle_delete =====

#[test]
fn delete_removes_under_cursor() {
    let result = handle_delete(at("abc", 1));
    assert_eq!(result.text(), "ac");
    assert_eq!(result.cursor(), 1);
}

#[test]
fn delete_at_end_is_noop() {
    let result = handle_delete(TextInput::new("abc"));
    assert_eq!(result.text(), "abc");
}

// ===== cursor movement =====

#[test]
fn cursor_left_saturates_at_zero() {
    let result = handle_cursor_left(handle_cursor_left(at("a", 1)));
    assert_eq!(result.cursor(), 0);
}

#[test]
fn cursor_right_saturates_at_length() {
    let result = handle_cursor_right(TextInput::new("ab"));
    assert_eq!(result.cursor(), 2);
}

#[test]
fn home_and_end_jump() {
    let home = handle_home(TextInput::new("abc"));
    assert_eq!(home.cursor(), 0);
    assert_eq!(handle_end(home).cursor(), 3);
}
