//! Toolbar control surface.
//!
//! The toolbar holds no authoritative state. [`ToolbarModel`] is a snapshot of
//! what each control should show, derived from the table state plus the search
//! text that is still waiting on its debounce.

use super::export::ExportFormat;
use crate::model::filters::STATUS;
use crate::model::row::display_value;
use crate::model::{Column, ColumnKey, TableRow};
use crate::state::table_state::TableState;
use std::collections::HashMap;

/// Which toolbar controls are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarFlags {
    /// Search box.
    pub show_search: bool,
    /// Status dropdown.
    pub show_status_filter: bool,
    /// Column visibility menu.
    pub show_column_settings: bool,
    /// Export menu.
    pub show_export: bool,
}

impl Default for ToolbarFlags {
    fn default() -> Self {
        Self {
            show_search: true,
            show_status_filter: true,
            show_column_settings: true,
            show_export: true,
        }
    }
}

/// One entry of the column visibility menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMenuItem {
    /// Column key.
    pub key: ColumnKey,
    /// Display label.
    pub header: String,
    /// Whether the column is currently shown.
    pub visible: bool,
}

/// What the toolbar renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarModel {
    /// Text in the search box, committed or not.
    pub search_text: String,
    /// True while typed search text has not been committed yet.
    pub search_pending: bool,
    /// Selected status, if any.
    pub status: Option<String>,
    /// Status choices.
    pub status_options: Vec<String>,
    /// Advanced filters as `(name, value)` pairs.
    pub advanced: Vec<(String, String)>,
    /// Number of active filters of any kind.
    pub active_filter_count: usize,
    /// Column visibility menu, in column order.
    pub column_menu: Vec<ColumnMenuItem>,
    /// Available export formats.
    pub export_formats: Vec<ExportFormat>,
    /// Number of selected rows.
    pub selected_count: usize,
    /// Control visibility.
    pub flags: ToolbarFlags,
}

impl ToolbarModel {
    /// Build the snapshot.
    ///
    /// `pending_search` is the debouncer's uncommitted text, if any.
    pub fn build(
        schema: &[Column],
        state: &TableState,
        status_options: Vec<String>,
        pending_search: Option<&str>,
        flags: ToolbarFlags,
    ) -> Self {
        let filters = state.filters();
        let committed = filters.search().unwrap_or_default();
        let search_text = pending_search.unwrap_or(committed).to_string();

        Self {
            search_pending: pending_search.is_some_and(|p| p != committed),
            search_text,
            status: filters.status().map(str::to_string),
            status_options,
            advanced: filters
                .advanced()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            active_filter_count: filters.len(),
            column_menu: column_menu(schema, state),
            export_formats: vec![ExportFormat::Csv, ExportFormat::Json],
            selected_count: state.selected_rows().len(),
            flags,
        }
    }
}

/// Column visibility menu entries in the current column order.
pub fn column_menu(schema: &[Column], state: &TableState) -> Vec<ColumnMenuItem> {
    let headers: HashMap<&ColumnKey, &str> = schema.iter().map(|c| (c.key(), c.header())).collect();
    state
        .column_order()
        .iter()
        .map(|key| ColumnMenuItem {
            key: key.clone(),
            header: headers.get(key).copied().unwrap_or(key.as_str()).to_string(),
            visible: state.is_visible(key),
        })
        .collect()
}

/// Distinct non-empty `status` values, sorted case-insensitively.
///
/// Values differing only by case collapse to the first spelling seen.
pub fn status_options<R: TableRow>(rows: &[R]) -> Vec<String> {
    let Ok(key) = ColumnKey::new(STATUS) else {
        return Vec::new();
    };
    let mut seen: HashMap<String, String> = HashMap::new();
    for row in rows {
        let text = display_value(&row.value(&key));
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            seen.entry(trimmed.to_lowercase())
                .or_insert_with(|| trimmed.to_string());
        }
    }
    let mut options: Vec<(String, String)> = seen.into_iter().collect();
    options.sort();
    options.into_iter().map(|(_, spelling)| spelling).collect()
}

/// Next status in the dropdown cycle: none, each option in turn, none again.
pub fn next_status(options: &[String], current: Option<&str>) -> Option<String> {
    let position = current.and_then(|c| options.iter().position(|o| o.eq_ignore_ascii_case(c)));
    match position {
        None if current.is_none() => options.first().cloned(),
        None => None,
        Some(i) => options.get(i + 1).cloned(),
    }
}
