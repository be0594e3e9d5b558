//! Panels that replace or accompany the grid: loading skeleton, error panel,
//! expanded-row detail pane, column visibility menu, and the footer.

use super::styles::GridStyles;
use crate::model::{Column, Pagination, TableRow};
use crate::view_state::ColumnMenuItem;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// A one-line message for the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Something happened.
    Info(String),
    /// Something failed.
    Error(String),
}

// ===== Skeleton =====

/// Placeholder bars shown while a fetch is outstanding.
pub struct Skeleton<'a> {
    styles: &'a GridStyles,
}

impl<'a> Skeleton<'a> {
    /// Skeleton in `styles`.
    pub fn new(styles: &'a GridStyles) -> Self {
        Self { styles }
    }
}

impl Widget for Skeleton<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Loading…");
        let inner = block.inner(area);
        block.render(area, buf);
        for (i, y) in (inner.y..inner.bottom()).enumerate() {
            // Uneven bar lengths read as rows rather than a solid block.
            let width = inner.width.saturating_mul([9, 7, 8, 6][i % 4]) / 10;
            buf.set_stringn(inner.x, y, "░".repeat(usize::from(width)), usize::from(width), self.styles.skeleton);
        }
    }
}

// ===== ErrorPanel =====

/// Shown in place of the grid after a failed fetch.
pub struct ErrorPanel<'a> {
    message: &'a str,
    styles: &'a GridStyles,
}

impl<'a> ErrorPanel<'a> {
    /// Panel for `message`.
    pub fn new(message: &'a str, styles: &'a GridStyles) -> Self {
        Self { message, styles }
    }
}

impl Widget for ErrorPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled("Failed to load data", self.styles.error)),
            Line::from(self.message),
            Line::default(),
            Line::from(Span::styled("Press r to retry", self.styles.muted)),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Error"))
            .render(area, buf);
    }
}

// ===== DetailPane =====

/// Every schema field of one expanded row, hidden columns included.
pub struct DetailPane<'a, R> {
    row: &'a R,
    schema: &'a [Column],
}

impl<'a, R: TableRow> DetailPane<'a, R> {
    /// Details of `row`.
    pub fn new(row: &'a R, schema: &'a [Column]) -> Self {
        Self { row, schema }
    }
}

impl<R: TableRow> Widget for DetailPane<'_, R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line<'_>> = self
            .schema
            .iter()
            .map(|column| {
                Line::from(vec![
                    Span::styled(format!("{}: ", column.header()), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(column.cell_text(self.row)),
                ])
            })
            .collect();
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Row {}", self.row.id())),
            )
            .render(area, buf);
    }
}

// ===== ColumnMenu =====

/// Centered popup listing every schema column with its visibility.
pub struct ColumnMenu<'a> {
    items: &'a [ColumnMenuItem],
    cursor: usize,
    styles: &'a GridStyles,
}

impl<'a> ColumnMenu<'a> {
    /// Menu over `items` with `cursor` highlighted.
    pub fn new(items: &'a [ColumnMenuItem], cursor: usize, styles: &'a GridStyles) -> Self {
        Self { items, cursor, styles }
    }
}

impl Widget for ColumnMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let lines: Vec<Line<'_>> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mark = if item.visible { "[x]" } else { "[ ]" };
                let style = if i == self.cursor {
                    self.styles.cursor_row
                } else {
                    Style::default()
                };
                Line::styled(format!("{mark} {}", item.header), style)
            })
            .collect();
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Columns (space: toggle, a: show all, esc: close)"),
            )
            .render(area, buf);
    }
}

/// A `percent_x` by `percent_y` rectangle centered in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

// ===== Footer =====

/// Pagination summary plus the latest notice or key hints.
pub struct Footer<'a> {
    pagination: Option<Pagination>,
    row_count: usize,
    notice: Option<&'a Notice>,
    styles: &'a GridStyles,
}

impl<'a> Footer<'a> {
    /// Footer for a page (or for `row_count` rows when unpaginated).
    pub fn new(pagination: Option<Pagination>, row_count: usize, styles: &'a GridStyles) -> Self {
        Self {
            pagination,
            row_count,
            notice: None,
            styles,
        }
    }

    /// Message shown on the second line.
    pub fn notice(mut self, notice: Option<&'a Notice>) -> Self {
        self.notice = notice;
        self
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let summary = match self.pagination {
            Some(p) => format!("{}  Page {}/{}", p.summary(), p.page(), p.total_pages()),
            None => format!("{} rows", self.row_count),
        };
        let second = match self.notice {
            Some(Notice::Info(text)) => Line::raw(text.clone()),
            Some(Notice::Error(text)) => Line::styled(text.clone(), self.styles.error),
            None => Line::styled(
                "/ search  o sort  space select  e edit  tab expand  [ ] page  q quit",
                self.styles.muted,
            ),
        };
        Paragraph::new(vec![Line::raw(summary), second]).render(area, buf);
    }
}
