//! Toolbar widget: search box, status filter, selection count, menu hints.

use super::styles::GridStyles;
use crate::state::TextInput;
use crate::view_state::ToolbarModel;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Renders a [`ToolbarModel`].
///
/// While the search box has focus its live buffer is drawn with a cursor in
/// place of the model's search text.
pub struct Toolbar<'a> {
    model: &'a ToolbarModel,
    search_input: Option<&'a TextInput>,
    styles: &'a GridStyles,
}

impl<'a> Toolbar<'a> {
    /// Toolbar for `model`.
    pub fn new(model: &'a ToolbarModel, styles: &'a GridStyles) -> Self {
        Self {
            model,
            search_input: None,
            styles,
        }
    }

    /// Draw `input` as the focused search box.
    pub fn search_input(mut self, input: Option<&'a TextInput>) -> Self {
        self.search_input = input;
        self
    }

    fn search_spans(&self) -> Vec<Span<'a>> {
        let mut spans = vec![Span::raw("Search: ")];
        match self.search_input {
            Some(input) => {
                let text = input.text();
                let before: String = text.chars().take(input.cursor()).collect();
                let mut rest = text.chars().skip(input.cursor());
                let at = rest.next().map_or_else(|| " ".to_string(), String::from);
                let after: String = rest.collect();
                spans.push(Span::raw(before));
                spans.push(Span::styled(at, self.styles.text_cursor));
                spans.push(Span::raw(after));
            }
            None if self.model.search_text.is_empty() => {
                spans.push(Span::styled("(none)", self.styles.muted));
            }
            None => spans.push(Span::raw(self.model.search_text.clone())),
        }
        if self.model.search_pending {
            spans.push(Span::styled(" …", self.styles.muted));
        }
        spans
    }
}

impl Widget for Toolbar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let flags = self.model.flags;
        let mut spans: Vec<Span<'_>> = Vec::new();

        if flags.show_search {
            spans.extend(self.search_spans());
        }
        if flags.show_status_filter {
            let status = self.model.status.as_deref().unwrap_or("all");
            spans.push(Span::raw(format!("  Status: {status}")));
        }
        if !self.model.advanced.is_empty() {
            let advanced: Vec<String> = self
                .model
                .advanced
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            spans.push(Span::raw(format!("  {}", advanced.join(" "))));
        }
        if self.model.selected_count > 0 {
            spans.push(Span::styled(
                format!("  Selected: {}", self.model.selected_count),
                self.styles.selected_row,
            ));
        }
        if flags.show_column_settings {
            spans.push(Span::styled("  [C] columns", self.styles.muted));
        }
        if flags.show_export {
            let formats: Vec<&str> = self.model.export_formats.iter().map(|f| f.extension()).collect();
            spans.push(Span::styled(format!("  [x/X] export {}", formats.join("/")), self.styles.muted));
        }

        Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("rostergrid"))
            .render(area, buf);
    }
}
