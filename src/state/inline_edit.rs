//! Inline cell editing.
//!
//! At most one cell is in edit mode. Starting an edit elsewhere abandons the
//! current one without saving. A save hands a [`SaveRequest`] to the caller and
//! waits for [`InlineEditor::complete_save`]; success returns to idle, failure
//! keeps the cell in edit mode with its buffer so the user can retry or cancel.
//! Results for a save whose edit was cancelled or abandoned are ignored.

use super::text_input::{self, TextInput};
use crate::model::row::display_value;
use crate::model::{CellValue, ColumnKey, Rejection, RowId, SaveError, TableRow};
use crate::view_state::columns::EffectiveColumn;
use serde_json::Value;
use tracing::{debug, warn};

/// Identifies one issued save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaveTicket(u64);

/// The cell being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditingCell {
    /// Row being edited.
    pub row_id: RowId,
    /// Column being edited.
    pub column_key: ColumnKey,
    /// Pending text.
    pub input: TextInput,
    /// Value before editing began; decides how the buffer is parsed.
    pub original: CellValue,
    /// Save in flight, if any.
    pub saving: Option<SaveTicket>,
    /// Message from the last failed save.
    pub last_error: Option<String>,
}

impl EditingCell {
    /// Whether this is the cell at (`row_id`, `column_key`).
    pub fn is_at(&self, row_id: &RowId, column_key: &ColumnKey) -> bool {
        &self.row_id == row_id && &self.column_key == column_key
    }

    /// Buffer converted back to a value of the original's kind where possible.
    pub fn value(&self) -> CellValue {
        parse_buffer(&self.original, self.input.text())
    }
}

/// Edit mode for the table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    /// No cell is being edited.
    #[default]
    Idle,
    /// One cell is being edited.
    Editing(EditingCell),
}

/// Everything the save handler needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// Ticket to hand back with the result.
    pub ticket: SaveTicket,
    /// Target row.
    pub row_id: RowId,
    /// Target column.
    pub column_key: ColumnKey,
    /// New value.
    pub value: CellValue,
}

/// How a save result was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Saved; the editor is idle again.
    Committed(SaveRequest),
    /// Rejected; the cell stays in edit mode with its buffer.
    Failed(SaveError),
    /// The ticket no longer matches the edit; result ignored.
    Stale,
}

/// Keys the editor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    /// Save.
    Enter,
    /// Cancel.
    Escape,
    /// Insert a character.
    Char(char),
    /// Delete before the cursor.
    Backspace,
    /// Delete under the cursor.
    Delete,
    /// Cursor left.
    Left,
    /// Cursor right.
    Right,
    /// Cursor to start.
    Home,
    /// Cursor to end.
    End,
}

/// What a key did.
#[derive(Debug, Clone, PartialEq)]
pub enum EditKeyOutcome {
    /// Enter: a save was started.
    Save(SaveRequest),
    /// Escape: the edit was discarded.
    Cancelled,
    /// The buffer or cursor changed.
    Edited,
}

/// Inline edit state machine.
#[derive(Debug, Clone, Default)]
pub struct InlineEditor {
    enabled: bool,
    state: EditState,
    next_ticket: u64,
}

impl InlineEditor {
    /// Editor; when `enabled` is false every edit is rejected.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: EditState::Idle,
            next_ticket: 0,
        }
    }

    /// Whether editing is enabled for the table.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current state.
    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// The cell in edit mode, if any.
    pub fn editing(&self) -> Option<&EditingCell> {
        match &self.state {
            EditState::Editing(cell) => Some(cell),
            EditState::Idle => None,
        }
    }

    /// Whether any cell of `row_id` is in edit mode.
    pub fn is_editing_row(&self, row_id: &RowId) -> bool {
        self.editing().is_some_and(|cell| &cell.row_id == row_id)
    }

    /// Put the cell at (`row`, `target`) in edit mode.
    ///
    /// Returns the abandoned edit, if another cell was being edited.
    pub fn start_edit(
        &mut self,
        row: &dyn TableRow,
        target: EffectiveColumn<'_>,
    ) -> Result<Option<EditingCell>, Rejection> {
        if !self.enabled {
            return Err(Rejection::EditingDisabled);
        }
        let column = match target {
            EffectiveColumn::Expansion => return Err(Rejection::NotEditable("expansion".into())),
            EffectiveColumn::Selection => return Err(Rejection::NotEditable("selection".into())),
            EffectiveColumn::Data(column) => column,
        };
        if !column.is_editable() {
            return Err(Rejection::NotEditable(column.key().to_string()));
        }
        if self
            .editing()
            .is_some_and(|cell| cell.is_at(row.id(), column.key()))
        {
            return Ok(None);
        }

        let original = row.value(column.key());
        let cell = EditingCell {
            row_id: row.id().clone(),
            column_key: column.key().clone(),
            input: TextInput::new(display_value(&original)),
            original,
            saving: None,
            last_error: None,
        };
        let abandoned = match std::mem::replace(&mut self.state, EditState::Editing(cell)) {
            EditState::Editing(previous) => {
                debug!(row = %previous.row_id, column = %previous.column_key, "abandoning unsaved edit");
                Some(previous)
            }
            EditState::Idle => None,
        };
        Ok(abandoned)
    }

    /// Apply a buffer transition. Ignored while idle or while a save is in flight.
    pub fn edit_input(&mut self, f: impl FnOnce(TextInput) -> TextInput) -> Result<(), Rejection> {
        let EditState::Editing(cell) = &mut self.state else {
            return Err(Rejection::NotEditing);
        };
        if cell.saving.is_some() {
            return Err(Rejection::SaveInFlight);
        }
        cell.input = f(std::mem::take(&mut cell.input));
        Ok(())
    }

    /// Start saving the buffer.
    pub fn begin_save(&mut self) -> Result<SaveRequest, Rejection> {
        let EditState::Editing(cell) = &mut self.state else {
            return Err(Rejection::NotEditing);
        };
        if cell.saving.is_some() {
            return Err(Rejection::SaveInFlight);
        }
        self.next_ticket += 1;
        let ticket = SaveTicket(self.next_ticket);
        cell.saving = Some(ticket);
        Ok(SaveRequest {
            ticket,
            row_id: cell.row_id.clone(),
            column_key: cell.column_key.clone(),
            value: cell.value(),
        })
    }

    /// Apply the save handler's result for `ticket`.
    pub fn complete_save(&mut self, ticket: SaveTicket, result: Result<(), SaveError>) -> SaveOutcome {
        let EditState::Editing(cell) = &mut self.state else {
            return SaveOutcome::Stale;
        };
        if cell.saving != Some(ticket) {
            return SaveOutcome::Stale;
        }
        cell.saving = None;
        match result {
            Ok(()) => {
                let request = SaveRequest {
                    ticket,
                    row_id: cell.row_id.clone(),
                    column_key: cell.column_key.clone(),
                    value: cell.value(),
                };
                self.state = EditState::Idle;
                SaveOutcome::Committed(request)
            }
            Err(error) => {
                warn!(row = %cell.row_id, column = %cell.column_key, %error, "save failed; edit kept");
                cell.last_error = Some(error.message.clone());
                SaveOutcome::Failed(error)
            }
        }
    }

    /// Discard the edit. Any save still in flight is ignored when it completes.
    pub fn cancel(&mut self) -> Option<EditingCell> {
        match std::mem::take(&mut self.state) {
            EditState::Editing(cell) => Some(cell),
            EditState::Idle => None,
        }
    }

    /// Keyboard contract: Enter saves, Escape cancels, the rest edits the buffer.
    pub fn handle_key(&mut self, key: EditKey) -> Result<EditKeyOutcome, Rejection> {
        match key {
            EditKey::Enter => self.begin_save().map(EditKeyOutcome::Save),
            EditKey::Escape => self
                .cancel()
                .map(|_| EditKeyOutcome::Cancelled)
                .ok_or(Rejection::NotEditing),
            EditKey::Char(ch) => self.edited(|input| text_input::handle_char_input(input, ch)),
            EditKey::Backspace => self.edited(text_input::handle_backspace),
            EditKey::Delete => self.edited(text_input::handle_delete),
            EditKey::Left => self.edited(text_input::handle_cursor_left),
            EditKey::Right => self.edited(text_input::handle_cursor_right),
            EditKey::Home => self.edited(text_input::handle_home),
            EditKey::End => self.edited(text_input::handle_end),
        }
    }

    fn edited(&mut self, f: impl FnOnce(TextInput) -> TextInput) -> Result<EditKeyOutcome, Rejection> {
        self.edit_input(f).map(|()| EditKeyOutcome::Edited)
    }
}

/// Parse edited text back into a value shaped like `original`.
///
/// Numbers and booleans stay numbers and booleans when the text parses as one;
/// an empty buffer over a null stays null. Everything else becomes a string.
pub fn parse_buffer(original: &CellValue, text: &str) -> CellValue {
    let trimmed = text.trim();
    match original {
        Value::Number(_) => {
            if let Ok(int) = trimmed.parse::<i64>() {
                return Value::from(int);
            }
            if let Some(number) = trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                return Value::Number(number);
            }
        }
        Value::Bool(_) => match trimmed.to_ascii_lowercase().as_str() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        },
        Value::Null if trimmed.is_empty() => return Value::Null,
        _ => {}
    }
    Value::String(text.to_string())
}

// ===== Tests =====

#[cfg(test)]
#[path = "inline_edit_tests.rs"]
mod tests;
