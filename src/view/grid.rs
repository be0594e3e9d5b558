//! The grid widget: one header row plus the windowed body.
//!
//! Only rows inside the [`VirtualWindow`] are touched; everything else is
//! accounted for by the scroll offset. Column geometry is computed once per
//! frame by [`layout_columns`] and reused for mouse hit testing.

use super::constants::{
    COLUMN_SPACING, EXPANSION_COLUMN_WIDTH, HEADER_HEIGHT, MIN_DATA_COLUMN_WIDTH, SELECTION_COLUMN_WIDTH,
    WRAPPED_HEADER_HEIGHT,
};
use super::styles::GridStyles;
use crate::model::{Align, ColumnKey, SortSpec, TableRow};
use crate::state::{EditingCell, PageSelection};
use crate::state::table_state::TableState;
use crate::view_state::{EffectiveColumn, EffectiveColumns, VirtualWindow};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// ===== Geometry =====

/// Where one effective column lands on screen.
#[derive(Debug, Clone, Copy)]
pub struct GridColumn<'a> {
    /// The column.
    pub column: EffectiveColumn<'a>,
    /// Left edge.
    pub x: u16,
    /// Width in cells.
    pub width: u16,
}

/// Lay out `columns` across `width` cells starting at `x`.
///
/// Synthetic columns and data columns with a width hint get their fixed width;
/// the rest share what is left, never narrower than
/// [`MIN_DATA_COLUMN_WIDTH`]. Columns that would start past the right edge
/// are dropped and the last one is clipped.
pub fn layout_columns<'a>(columns: &EffectiveColumns<'a>, x: u16, width: u16) -> Vec<GridColumn<'a>> {
    let count = columns.len() as u16;
    let spacing = COLUMN_SPACING.saturating_mul(count.saturating_sub(1));
    let fixed: u16 = columns.iter().filter_map(|c| fixed_width(&c)).fold(0u16, u16::saturating_add);
    let flexible = columns.iter().filter(|c| fixed_width(c).is_none()).count() as u16;
    let share = match flexible {
        0 => 0,
        n => (width.saturating_sub(fixed).saturating_sub(spacing) / n).max(MIN_DATA_COLUMN_WIDTH),
    };

    let right = x.saturating_add(width);
    let mut cursor = x;
    let mut laid_out = Vec::with_capacity(columns.len());
    for column in columns.iter() {
        if cursor >= right {
            break;
        }
        let wanted = fixed_width(&column).unwrap_or(share);
        let width = wanted.min(right - cursor);
        laid_out.push(GridColumn { column, x: cursor, width });
        cursor = cursor.saturating_add(wanted).saturating_add(COLUMN_SPACING);
    }
    laid_out
}

fn fixed_width(column: &EffectiveColumn<'_>) -> Option<u16> {
    match column {
        EffectiveColumn::Expansion => Some(EXPANSION_COLUMN_WIDTH),
        EffectiveColumn::Selection => Some(SELECTION_COLUMN_WIDTH),
        EffectiveColumn::Data(column) => column.width_hint(),
    }
}

/// Lines the header needs: two when a wrapping header is wider than its column.
pub fn header_height(columns: &[GridColumn<'_>]) -> u16 {
    let wraps = columns.iter().any(|c| match c.column {
        EffectiveColumn::Data(data) => data.wraps_header() && data.header().width() > usize::from(c.width),
        _ => false,
    });
    if wraps {
        WRAPPED_HEADER_HEIGHT
    } else {
        HEADER_HEIGHT
    }
}

/// Split `text` into a first line of at most `width` cells and the rest.
///
/// Breaks after the last space that fits, or mid-word when none does.
pub fn wrap_header(text: &str, width: u16) -> (String, String) {
    let width = usize::from(width);
    if text.width() <= width {
        return (text.to_string(), String::new());
    }
    let mut used = 0;
    let mut cut = 0;
    let mut last_space = None;
    for (index, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        if ch == ' ' {
            last_space = Some(index);
        }
        used += w;
        cut = index + ch.len_utf8();
    }
    match last_space {
        Some(space) if space > 0 => (text[..space].to_string(), text[space + 1..].trim_start().to_string()),
        _ => (text[..cut].to_string(), text[cut..].to_string()),
    }
}

/// Index into `columns` of the column covering screen column `x`.
pub fn column_at(columns: &[GridColumn<'_>], x: u16) -> Option<usize> {
    columns
        .iter()
        .position(|c| x >= c.x && x < c.x.saturating_add(c.width))
}

/// Pad or truncate `text` to exactly `width` cells.
///
/// Truncated text ends in `…`. Line breaks are flattened to spaces.
pub fn fit(text: &str, width: u16, align: Align) -> String {
    let width = usize::from(width);
    if width == 0 {
        return String::new();
    }
    let flat: String = text.chars().map(|c| if c.is_control() { ' ' } else { c }).collect();
    let clipped = if flat.width() > width {
        let mut out = String::new();
        let mut used = 0;
        for ch in flat.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w + 1 > width {
                break;
            }
            used += w;
            out.push(ch);
        }
        out.push('…');
        out
    } else {
        flat
    };

    let pad = width.saturating_sub(clipped.width());
    match align {
        Align::Left => format!("{clipped}{}", " ".repeat(pad)),
        Align::Right => format!("{}{clipped}", " ".repeat(pad)),
        Align::Center => {
            let left = pad / 2;
            format!("{}{clipped}{}", " ".repeat(left), " ".repeat(pad - left))
        }
    }
}

// ===== GridView =====

/// Drag feedback for the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragHighlight<'a> {
    /// Column being dragged.
    pub source: Option<&'a ColumnKey>,
    /// Column under the drag.
    pub target: Option<&'a ColumnKey>,
}

/// Header plus windowed body rows.
pub struct GridView<'a, R> {
    columns: &'a [GridColumn<'a>],
    rows: &'a [&'a R],
    window: VirtualWindow,
    scroll_offset: usize,
    state: &'a TableState,
    page_selection: PageSelection,
    editing: Option<&'a EditingCell>,
    drag: DragHighlight<'a>,
    cursor_row: Option<usize>,
    focused_column: Option<&'a ColumnKey>,
    styles: &'a GridStyles,
}

impl<'a, R: TableRow> GridView<'a, R> {
    /// Grid over the displayed `rows`, drawing only `window`.
    pub fn new(
        columns: &'a [GridColumn<'a>],
        rows: &'a [&'a R],
        window: VirtualWindow,
        state: &'a TableState,
        styles: &'a GridStyles,
    ) -> Self {
        Self {
            columns,
            rows,
            window,
            scroll_offset: 0,
            state,
            page_selection: PageSelection::None,
            editing: None,
            drag: DragHighlight::default(),
            cursor_row: None,
            focused_column: None,
            styles,
        }
    }

    /// First body line shown.
    pub fn scroll_offset(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// Header checkbox state.
    pub fn page_selection(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    /// Cell in edit mode.
    pub fn editing(mut self, cell: Option<&'a EditingCell>) -> Self {
        self.editing = cell;
        self
    }

    /// Drag feedback.
    pub fn drag(mut self, drag: DragHighlight<'a>) -> Self {
        self.drag = drag;
        self
    }

    /// Row and column with keyboard focus.
    pub fn cursor(mut self, row: Option<usize>, column: Option<&'a ColumnKey>) -> Self {
        self.cursor_row = row;
        self.focused_column = column;
        self
    }

    fn header_style(&self, key: &ColumnKey, sort: Option<&SortSpec>) -> Style {
        if self.drag.source == Some(key) {
            self.styles.dragged_header
        } else if self.drag.target == Some(key) {
            self.styles.drop_target
        } else if self.focused_column == Some(key) {
            self.styles.focused_header
        } else if sort.is_some_and(|s| &s.key == key) {
            self.styles.sorted_header
        } else {
            self.styles.header
        }
    }

    fn render_header(&self, area: Rect, height: u16, buf: &mut Buffer) {
        let sort = self.state.sort();
        for column in self.columns {
            let (text, style, align) = match column.column {
                EffectiveColumn::Expansion => (String::new(), self.styles.header, Align::Left),
                EffectiveColumn::Selection => {
                    (self.page_selection.glyph().to_string(), self.styles.header, Align::Left)
                }
                EffectiveColumn::Data(data) => {
                    let arrow = match sort {
                        Some(spec) if &spec.key == data.key() => format!(" {}", spec.direction.arrow()),
                        _ => String::new(),
                    };
                    (
                        format!("{}{arrow}", data.header()),
                        self.header_style(data.key(), sort),
                        data.alignment(),
                    )
                }
            };
            let wraps = matches!(column.column, EffectiveColumn::Data(data) if data.wraps_header());
            if height > 1 && wraps {
                let (first, rest) = wrap_header(&text, column.width);
                buf.set_stringn(column.x, area.y, fit(&first, column.width, align), usize::from(column.width), style);
                buf.set_stringn(column.x, area.y + 1, fit(&rest, column.width, align), usize::from(column.width), style);
            } else {
                buf.set_stringn(column.x, area.y, fit(&text, column.width, align), usize::from(column.width), style);
            }
        }
    }

    fn render_row(&self, row: &R, index: usize, y: u16, area: Rect, buf: &mut Buffer) {
        let selected = self.state.is_selected(row.id());
        let row_style = if self.cursor_row == Some(index) {
            self.styles.cursor_row
        } else if selected {
            self.styles.selected_row
        } else {
            Style::default()
        };
        buf.set_style(Rect::new(area.x, y, area.width, 1), row_style);

        for column in self.columns {
            match column.column {
                EffectiveColumn::Expansion => {
                    let glyph = if self.state.is_expanded(row.id()) { "▾" } else { "▸" };
                    buf.set_stringn(column.x, y, glyph, usize::from(column.width), row_style);
                }
                EffectiveColumn::Selection => {
                    let glyph = if selected { "[x]" } else { "[ ]" };
                    buf.set_stringn(column.x, y, glyph, usize::from(column.width), row_style);
                }
                EffectiveColumn::Data(data) => match self.editing {
                    Some(cell) if cell.is_at(row.id(), data.key()) => {
                        self.render_edit_cell(cell, column, y, buf);
                    }
                    _ => {
                        let text = fit(&data.cell_text(row), column.width, data.alignment());
                        buf.set_stringn(column.x, y, text, usize::from(column.width), row_style);
                    }
                },
            }
        }
    }

    fn render_edit_cell(&self, cell: &EditingCell, column: &GridColumn<'_>, y: u16, buf: &mut Buffer) {
        let mut style = self.styles.editing_cell;
        if cell.saving.is_some() {
            style = style.add_modifier(Modifier::DIM);
        }
        let text = cell.input.text();
        buf.set_stringn(column.x, y, fit(text, column.width, Align::Left), usize::from(column.width), style);

        let before: String = text.chars().take(cell.input.cursor()).collect();
        let offset = u16::try_from(before.width()).unwrap_or(u16::MAX);
        if cell.saving.is_none() && offset < column.width {
            buf.set_style(Rect::new(column.x + offset, y, 1, 1), self.styles.text_cursor);
        }
    }
}

impl<R: TableRow> Widget for GridView<'_, R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let header = header_height(self.columns).min(area.height);
        self.render_header(area, header, buf);

        let body = Rect {
            y: area.y + header,
            height: area.height.saturating_sub(header),
            ..area
        };
        if body.height == 0 {
            return;
        }
        if self.rows.is_empty() {
            let message = fit("No records found", body.width, Align::Center);
            buf.set_stringn(body.x, body.y, message, usize::from(body.width), self.styles.muted);
            return;
        }

        let visible = self.scroll_offset..self.scroll_offset + usize::from(body.height);
        for index in self.window.indices().filter(|i| visible.contains(i)) {
            let Some(row) = self.rows.get(index) else {
                continue;
            };
            let y = body.y + (index - self.scroll_offset) as u16;
            self.render_row(row, index, y, body, buf);
        }
    }
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
