//! Keyboard bindings configuration.

use crate::model::TableAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Provides default vim-style bindings. Keys typed into the search box or an
/// edited cell never reach this map; the view routes them to the text input.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, TableAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    pub fn get(&self, key: KeyEvent) -> Option<TableAction> {
        self.bindings.get(&key).copied()
    }

    /// Bind `key` to `action`, replacing any previous binding.
    pub fn bind(&mut self, key: KeyEvent, action: TableAction) {
        self.bindings.insert(key, action);
    }
}

fn plain(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn shift(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::SHIFT)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

impl Default for KeyBindings {
    fn default() -> Self {
        use TableAction::*;

        let defaults = [
            // Row cursor
            (plain(KeyCode::Char('j')), CursorDown),
            (plain(KeyCode::Down), CursorDown),
            (plain(KeyCode::Char('k')), CursorUp),
            (plain(KeyCode::Up), CursorUp),
            (ctrl('d'), ScrollPageDown),
            (plain(KeyCode::PageDown), ScrollPageDown),
            (ctrl('u'), ScrollPageUp),
            (plain(KeyCode::PageUp), ScrollPageUp),
            (plain(KeyCode::Char('g')), CursorTop),
            (plain(KeyCode::Home), CursorTop),
            (shift(KeyCode::Char('G')), CursorBottom),
            (plain(KeyCode::End), CursorBottom),
            // Column cursor and reorder
            (plain(KeyCode::Char('h')), ColumnLeft),
            (plain(KeyCode::Left), ColumnLeft),
            (plain(KeyCode::Char('l')), ColumnRight),
            (plain(KeyCode::Right), ColumnRight),
            (shift(KeyCode::Char('H')), MoveColumnLeft),
            (shift(KeyCode::Left), MoveColumnLeft),
            (shift(KeyCode::Char('L')), MoveColumnRight),
            (shift(KeyCode::Right), MoveColumnRight),
            (plain(KeyCode::Char('o')), SortByColumn),
            (shift(KeyCode::Char('C')), ToggleColumnMenu),
            // Pagination
            (plain(KeyCode::Char(']')), NextPage),
            (plain(KeyCode::Char('[')), PrevPage),
            // Filters
            (plain(KeyCode::Char('/')), StartSearch),
            (plain(KeyCode::Char('f')), CycleStatusFilter),
            (plain(KeyCode::Char('c')), ClearFilters),
            // Rows
            (plain(KeyCode::Char(' ')), ToggleSelect),
            (plain(KeyCode::Char('a')), TogglePageSelection),
            (plain(KeyCode::Tab), ToggleExpand),
            (plain(KeyCode::Enter), ActivateRow),
            (plain(KeyCode::Char('e')), EditCell),
            // Bulk / export
            (plain(KeyCode::Char('b')), RunBulkAction),
            (plain(KeyCode::Char('x')), ExportCsv),
            (shift(KeyCode::Char('X')), ExportJson),
            // Application
            (plain(KeyCode::Char('r')), Retry),
            (plain(KeyCode::Char('q')), Quit),
            (ctrl('c'), Quit),
        ];

        Self {
            bindings: defaults.into_iter().collect(),
        }
    }
}
