//! TUI rendering and terminal management (impure shell)
//!
//! [`TuiApp`] owns one [`TableSession`], the data source behind it and the
//! [`Dispatcher`] that carries requests between them. Keys and mouse events
//! are translated into session operations; the session's answers are drawn
//! each frame. View-only state (row cursor, scroll offset, input mode) lives
//! here, never in the session.

pub mod constants;
pub mod grid;
pub mod panels;
pub mod styles;
pub mod toolbar;

pub use grid::{column_at, fit, header_height, layout_columns, wrap_header, DragHighlight, GridColumn, GridView};
pub use panels::{ColumnMenu, DetailPane, ErrorPanel, Footer, Notice, Skeleton};
pub use styles::{ColorConfig, GridStyles};
pub use toolbar::Toolbar;

use crate::config::keybindings::KeyBindings;
use crate::integration::Dispatcher;
use crate::model::{ColumnKey, Record, Rejection, RowId, TableAction, TableRow};
use crate::source::SimulatedServer;
use crate::state::text_input;
use crate::state::{EditKey, EditKeyOutcome, LoadState, SaveOutcome, TableSession, TextInput};
use crate::view_state::window::{max_scroll_offset, reveal_row};
use crate::view_state::{EffectiveColumn, ExportFormat, ExportScope, RowHeight};
use constants::{
    COLUMN_MENU_HEIGHT_PERCENT, COLUMN_MENU_WIDTH_PERCENT, DETAIL_PANE_HEIGHT, FOOTER_HEIGHT, HEADER_HEIGHT,
    TOOLBAR_HEIGHT,
};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// Shell settings that are not table features.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Key map for normal mode.
    pub key_bindings: KeyBindings,
    /// Color handling.
    pub colors: ColorConfig,
    /// Delay before the data source answers a request.
    pub latency: Duration,
    /// Directory export files are written to.
    pub export_dir: PathBuf,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            key_bindings: KeyBindings::default(),
            colors: ColorConfig::from_env_and_args(false),
            latency: Duration::ZERO,
            export_dir: PathBuf::from("."),
        }
    }
}

/// Where keys go.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputMode {
    /// Key bindings apply.
    #[default]
    Normal,
    /// Typing into the search box.
    Search(TextInput),
    /// Column visibility menu is open.
    ColumnMenu {
        /// Highlighted entry.
        cursor: usize,
    },
}

/// Keyboard focus within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridCursor {
    /// Index into the displayed rows.
    pub row: usize,
    /// Index into the visible data columns.
    pub column: usize,
    /// First body line shown.
    pub scroll: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FrameAreas {
    toolbar: Rect,
    grid: Rect,
    detail: Option<Rect>,
    footer: Rect,
    /// Lines taken by the grid header.
    header_height: u16,
}

impl FrameAreas {
    fn split(area: Rect, detail: bool) -> Self {
        let mut constraints = vec![Constraint::Length(TOOLBAR_HEIGHT), Constraint::Min(HEADER_HEIGHT + 1)];
        if detail {
            constraints.push(Constraint::Length(DETAIL_PANE_HEIGHT));
        }
        constraints.push(Constraint::Length(FOOTER_HEIGHT));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        Self {
            toolbar: chunks[0],
            grid: chunks[1],
            detail: detail.then(|| chunks[2]),
            footer: chunks[chunks.len() - 1],
            header_height: HEADER_HEIGHT,
        }
    }

    fn body_y(&self) -> u16 {
        self.grid.y.saturating_add(self.header_height)
    }

    fn body_height(&self) -> usize {
        usize::from(self.grid.height.saturating_sub(self.header_height)).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HitTarget {
    Expansion,
    Selection,
    Data(ColumnKey),
}

#[derive(Debug, Clone)]
struct HeaderHit {
    x: u16,
    width: u16,
    target: HitTarget,
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    session: TableSession<Record>,
    source: SimulatedServer,
    dispatcher: Dispatcher,
    key_bindings: KeyBindings,
    styles: GridStyles,
    export_dir: PathBuf,
    mode: InputMode,
    cursor: GridCursor,
    notice: Option<Notice>,
    /// Areas of the last frame, for mouse hit testing.
    areas: FrameAreas,
    headers: Vec<HeaderHit>,
    /// Header pressed but not yet dragged; releasing it sorts.
    pressed: Option<ColumnKey>,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(
        session: TableSession<Record>,
        source: SimulatedServer,
        options: ShellOptions,
    ) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(event::EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self::with_terminal(terminal, session, source, options))
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits. Wakes up for input, for a pending search
    /// debounce, and for requests coming due; redraws only when something
    /// changed.
    pub fn run(&mut self) -> Result<(), TuiError> {
        const IDLE_POLL: Duration = Duration::from_millis(250);

        self.service(Instant::now());
        self.draw()?;

        loop {
            let now = Instant::now();
            let timeout = [self.session.search_due_in(now), self.dispatcher.next_due_in(now)]
                .into_iter()
                .flatten()
                .min()
                .map_or(IDLE_POLL, |due| due.min(IDLE_POLL));

            let mut dirty = false;
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key, Instant::now()) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Mouse(mouse) => {
                        self.handle_mouse(mouse);
                        dirty = true;
                    }
                    Event::Resize(..) => dirty = true,
                    _ => {}
                }
            }

            dirty |= self.service(Instant::now());
            if dirty {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Application drawing to an existing terminal. Does not touch terminal modes.
    pub fn with_terminal(
        terminal: Terminal<B>,
        session: TableSession<Record>,
        source: SimulatedServer,
        options: ShellOptions,
    ) -> Self {
        Self {
            terminal,
            session,
            source,
            dispatcher: Dispatcher::new(options.latency),
            key_bindings: options.key_bindings,
            styles: GridStyles::with_color_config(options.colors),
            export_dir: options.export_dir,
            mode: InputMode::Normal,
            cursor: GridCursor::default(),
            notice: None,
            areas: FrameAreas::default(),
            headers: Vec::new(),
            pressed: None,
        }
    }

    /// The table session.
    pub fn session(&self) -> &TableSession<Record> {
        &self.session
    }

    /// The data source.
    pub fn source(&self) -> &SimulatedServer {
        &self.source
    }

    /// Current input mode.
    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    /// Grid focus.
    pub fn cursor(&self) -> GridCursor {
        self.cursor
    }

    /// Latest footer message.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Hand the session back, e.g. to close it.
    pub fn into_session(self) -> TableSession<Record> {
        self.session
    }

    // ===== Background work =====

    /// Commit a due search and deliver due requests. Returns true if anything
    /// reached the session.
    fn service(&mut self, now: Instant) -> bool {
        let revision = self.session.revision();
        report(self.session.tick(now));

        let pumped = self.dispatcher.pump(&mut self.session, &mut self.source, now);
        for outcome in &pumped.saves {
            match outcome {
                SaveOutcome::Committed(request) => {
                    self.notice = Some(Notice::Info(format!(
                        "Saved {} for row {}",
                        request.column_key, request.row_id
                    )));
                }
                SaveOutcome::Failed(error) => self.notice = Some(Notice::Error(error.to_string())),
                SaveOutcome::Stale => {}
            }
        }
        revision != self.session.revision() || !pumped.is_empty()
    }

    // ===== Keys =====

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if self.session.editing().is_some() {
            self.handle_edit_key(key, now);
            return false;
        }
        match self.mode {
            InputMode::Search(_) => {
                self.handle_search_key(key, now);
                return false;
            }
            InputMode::ColumnMenu { .. } => {
                self.handle_menu_key(key);
                return false;
            }
            InputMode::Normal => {}
        }

        match self.key_bindings.get(key) {
            Some(action) => self.dispatch(action),
            None => false,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, now: Instant) {
        let edit = match key.code {
            KeyCode::Enter => EditKey::Enter,
            KeyCode::Esc => EditKey::Escape,
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => EditKey::Char(ch),
            KeyCode::Backspace => EditKey::Backspace,
            KeyCode::Delete => EditKey::Delete,
            KeyCode::Left => EditKey::Left,
            KeyCode::Right => EditKey::Right,
            KeyCode::Home => EditKey::Home,
            KeyCode::End => EditKey::End,
            _ => return,
        };
        match self.session.edit_key(edit) {
            Ok(EditKeyOutcome::Save(request)) => {
                self.notice = Some(Notice::Info("Saving…".into()));
                self.dispatcher.submit_save(request, now);
            }
            Ok(EditKeyOutcome::Cancelled) => self.notice = None,
            Ok(EditKeyOutcome::Edited) => {}
            Err(rejection) => debug!(%rejection, "edit key ignored"),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
        let InputMode::Search(input) = std::mem::take(&mut self.mode) else {
            return;
        };
        let edited = match key.code {
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                text_input::handle_char_input(input.clone(), ch)
            }
            KeyCode::Backspace => text_input::handle_backspace(input.clone()),
            KeyCode::Delete => text_input::handle_delete(input.clone()),
            KeyCode::Left => text_input::handle_cursor_left(input.clone()),
            KeyCode::Right => text_input::handle_cursor_right(input.clone()),
            KeyCode::Home => text_input::handle_home(input.clone()),
            KeyCode::End => text_input::handle_end(input.clone()),
            KeyCode::Enter => {
                report(self.session.submit_search());
                self.reset_rows();
                return;
            }
            KeyCode::Esc => return,
            _ => input.clone(),
        };
        if edited.text() != input.text() {
            self.session.type_search(edited.text().to_string(), now);
        }
        self.mode = InputMode::Search(edited);
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let InputMode::ColumnMenu { cursor } = self.mode else {
            return;
        };
        let items = self.session.toolbar().column_menu;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let last = items.len().saturating_sub(1);
                self.mode = InputMode::ColumnMenu {
                    cursor: (cursor + 1).min(last),
                };
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.mode = InputMode::ColumnMenu {
                    cursor: cursor.saturating_sub(1),
                };
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(item) = items.get(cursor) {
                    report(self.session.toggle_column(&item.key));
                }
            }
            KeyCode::Char('a') => report(self.session.show_all_columns()),
            KeyCode::Esc | KeyCode::Char('C') | KeyCode::Char('q') => self.mode = InputMode::Normal,
            _ => {}
        }
    }

    /// Apply a bound action. Returns true to quit.
    fn dispatch(&mut self, action: TableAction) -> bool {
        let flags = self.session.features().toolbar;
        match action {
            TableAction::Quit => return true,

            TableAction::CursorUp => self.move_cursor(-1),
            TableAction::CursorDown => self.move_cursor(1),
            TableAction::ScrollPageUp => self.move_cursor(-(self.areas.body_height() as isize)),
            TableAction::ScrollPageDown => self.move_cursor(self.areas.body_height() as isize),
            TableAction::CursorTop => self.move_cursor(isize::MIN),
            TableAction::CursorBottom => self.move_cursor(isize::MAX),

            TableAction::ColumnLeft => self.cursor.column = self.cursor.column.saturating_sub(1),
            TableAction::ColumnRight => {
                let last = self.session.effective_columns().data_columns().len().saturating_sub(1);
                self.cursor.column = (self.cursor.column + 1).min(last);
            }
            TableAction::MoveColumnLeft | TableAction::MoveColumnRight => {
                let delta = if action == TableAction::MoveColumnLeft { -1 } else { 1 };
                if let Some(key) = self.focused_key() {
                    if self.session.move_column(&key, delta).is_ok() {
                        if let Some(position) = self.session.effective_columns().data_position(&key) {
                            self.cursor.column = position;
                        }
                    }
                }
            }
            TableAction::SortByColumn => {
                if let Some(key) = self.focused_key() {
                    report(self.session.click_sort(&key));
                }
            }
            TableAction::ToggleColumnMenu => {
                if flags.show_column_settings {
                    self.mode = InputMode::ColumnMenu { cursor: 0 };
                }
            }

            TableAction::NextPage => {
                report(self.session.next_page());
                self.reset_rows();
            }
            TableAction::PrevPage => {
                report(self.session.prev_page());
                self.reset_rows();
            }

            TableAction::StartSearch => {
                if flags.show_search {
                    let text = self.session.toolbar().search_text;
                    self.mode = InputMode::Search(TextInput::new(text));
                }
            }
            TableAction::CycleStatusFilter => {
                if flags.show_status_filter {
                    report(self.session.cycle_status());
                    self.reset_rows();
                }
            }
            TableAction::ClearFilters => {
                report(self.session.clear_filters());
                self.reset_rows();
            }

            TableAction::ToggleSelect => {
                if let Some(id) = self.current_row_id() {
                    report(self.session.toggle_row(&id));
                }
            }
            TableAction::TogglePageSelection => report(self.session.toggle_page_selection()),
            TableAction::ToggleExpand => {
                if let Some(id) = self.current_row_id() {
                    report(self.session.toggle_expanded(&id));
                }
            }
            TableAction::ActivateRow => {
                if let Some(id) = self.current_row_id() {
                    report(self.session.click_row(&id).map(|_| ()));
                }
            }
            TableAction::EditCell => {
                if let (Some(id), Some(key)) = (self.current_row_id(), self.focused_key()) {
                    report(self.session.start_edit(&id, &key));
                }
            }

            TableAction::RunBulkAction => self.run_bulk_action(),
            TableAction::ExportCsv => {
                if flags.show_export {
                    self.export(ExportFormat::Csv);
                }
            }
            TableAction::ExportJson => {
                if flags.show_export {
                    self.export(ExportFormat::Json);
                }
            }
            TableAction::Retry => {
                if self.session.load_state().is_failed() {
                    self.session.retry();
                }
            }
        }
        false
    }

    fn run_bulk_action(&mut self) {
        let Some(name) = self.session.bulk_action_names().next().map(str::to_string) else {
            self.notice = Some(Notice::Info("No bulk actions registered".into()));
            return;
        };
        match self.session.run_bulk_action(&name) {
            Ok(count) => self.notice = Some(Notice::Info(format!("{name}: {count} rows"))),
            Err(rejection) => debug!(%rejection, "bulk action rejected"),
        }
    }

    fn export(&mut self, format: ExportFormat) {
        let scope = if self.session.state().selected_rows().is_empty() {
            ExportScope::All
        } else {
            ExportScope::Selected
        };
        let document = self.session.export(format, scope);
        let path = self
            .export_dir
            .join(format!("rostergrid-export.{}", format.extension()));
        let written = document
            .encode()
            .map_err(|e| e.to_string())
            .and_then(|text| std::fs::write(&path, text).map_err(|e| e.to_string()));
        self.notice = Some(match written {
            Ok(()) => {
                info!(path = %path.display(), rows = document.len(), "export written");
                Notice::Info(format!("Exported {} rows to {}", document.len(), path.display()))
            }
            Err(message) => {
                warn!(path = %path.display(), %message, "export failed");
                Notice::Error(format!("Export failed: {message}"))
            }
        });
    }

    // ===== Mouse =====

    /// Handle a single mouse event.
    ///
    /// Header: press and release sorts, press and drag reorders. Body: a click
    /// moves the cursor and activates the row, or toggles the checkbox or
    /// expander under it.
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let header_y = self.areas.grid.y;
        let body_y = self.areas.body_y();
        let in_header = mouse.row >= header_y && mouse.row < body_y;
        let in_grid = mouse.row >= body_y && mouse.row < self.areas.grid.bottom();

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if in_header => {
                match self.hit(mouse.column) {
                    Some(HitTarget::Data(key)) => self.pressed = Some(key),
                    Some(HitTarget::Selection) => report(self.session.toggle_page_selection()),
                    _ => {}
                }
            }
            MouseEventKind::Down(MouseButton::Left) if in_grid => {
                let row = self.cursor.scroll + usize::from(mouse.row - body_y);
                if row >= self.session.displayed_rows().rows.len() {
                    return;
                }
                self.cursor.row = row;
                let Some(id) = self.current_row_id() else {
                    return;
                };
                match self.hit(mouse.column) {
                    Some(HitTarget::Selection) => report(self.session.toggle_row(&id)),
                    Some(HitTarget::Expansion) => report(self.session.toggle_expanded(&id)),
                    Some(HitTarget::Data(key)) => {
                        if let Some(position) = self.session.effective_columns().data_position(&key) {
                            self.cursor.column = position;
                        }
                        report(self.session.click_row(&id).map(|_| ()));
                    }
                    None => {}
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(source) = self.pressed.take() {
                    report(self.session.drag_start(&source));
                }
                if self.session.reorder().dragging().is_none() {
                    return;
                }
                match self.hit(mouse.column) {
                    Some(HitTarget::Data(target)) if in_header => {
                        if self.session.reorder().hovered() != Some(&target) {
                            report(self.session.drag_over(&target));
                        }
                    }
                    _ => self.session.drag_leave(),
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.session.reorder().dragging().is_some() {
                    if self.session.reorder().hovered().is_some() {
                        report(self.session.drop_column());
                    }
                    self.session.drag_end();
                } else if let Some(key) = self.pressed.take() {
                    report(self.session.click_sort(&key));
                }
            }
            MouseEventKind::ScrollDown => self.move_cursor(3),
            MouseEventKind::ScrollUp => self.move_cursor(-3),
            _ => {}
        }
    }

    fn hit(&self, x: u16) -> Option<HitTarget> {
        self.headers
            .iter()
            .find(|h| x >= h.x && x < h.x.saturating_add(h.width))
            .map(|h| h.target.clone())
    }

    // ===== Cursor =====

    fn current_row_id(&self) -> Option<RowId> {
        self.session
            .displayed_rows()
            .rows
            .get(self.cursor.row)
            .map(|row| row.id().clone())
    }

    fn focused_key(&self) -> Option<ColumnKey> {
        self.session
            .effective_columns()
            .data_columns()
            .get(self.cursor.column)
            .map(|column| column.key().clone())
    }

    fn move_cursor(&mut self, delta: isize) {
        let count = self.session.displayed_rows().rows.len();
        let last = count.saturating_sub(1);
        self.cursor.row = self.cursor.row.saturating_add_signed(delta).min(last);
        self.cursor.scroll = reveal_row(
            self.cursor.row,
            self.cursor.scroll,
            RowHeight::ONE,
            self.areas.body_height(),
        );
    }

    fn reset_rows(&mut self) {
        self.cursor.row = 0;
        self.cursor.scroll = 0;
    }

    /// Keep the cursor on an existing row and column after the data changed.
    fn clamp_cursor(&mut self, body_height: usize) {
        let rows = self.session.displayed_rows().rows.len();
        let columns = self.session.effective_columns().data_columns().len();
        self.cursor.row = self.cursor.row.min(rows.saturating_sub(1));
        self.cursor.column = self.cursor.column.min(columns.saturating_sub(1));
        let max = max_scroll_offset(rows, RowHeight::ONE, body_height);
        self.cursor.scroll = reveal_row(self.cursor.row, self.cursor.scroll.min(max), RowHeight::ONE, body_height);
    }

    // ===== Rendering =====

    /// Render the current frame
    fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        let detail = self
            .current_row_id()
            .is_some_and(|id| self.session.state().is_expanded(&id));
        self.areas = FrameAreas::split(area, detail);

        let columns = self.session.effective_columns();
        let grid = layout_columns(&columns, self.areas.grid.x, self.areas.grid.width);
        self.areas.header_height = header_height(&grid);
        self.headers = grid
            .into_iter()
            .filter_map(|c| {
                let target = match c.column {
                    EffectiveColumn::Expansion => HitTarget::Expansion,
                    EffectiveColumn::Selection => HitTarget::Selection,
                    EffectiveColumn::Data(column) => HitTarget::Data(column.key().clone()),
                };
                (c.width > 0).then_some(HeaderHit {
                    x: c.x,
                    width: c.width,
                    target,
                })
            })
            .collect();
        self.clamp_cursor(self.areas.body_height());

        let view = FrameView {
            session: &self.session,
            mode: &self.mode,
            cursor: self.cursor,
            notice: self.notice.as_ref(),
            styles: &self.styles,
            areas: self.areas,
        };
        self.terminal.draw(|frame| render_frame(frame, &view))?;
        Ok(())
    }
}

// ===== Test Helpers =====

#[cfg(test)]
#[allow(dead_code)]
impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Handle a key at `now` (test-only accessor). Returns true to quit.
    pub(crate) fn handle_key_test(&mut self, key: KeyEvent, now: Instant) -> bool {
        self.handle_key(key, now)
    }

    /// Handle a mouse event (test-only accessor).
    pub(crate) fn handle_mouse_test(&mut self, mouse: MouseEvent) {
        self.handle_mouse(mouse)
    }

    /// Run background work at `now` (test-only accessor).
    pub(crate) fn service_test(&mut self, now: Instant) -> bool {
        self.service(now)
    }

    /// Render a single frame (test-only accessor).
    pub(crate) fn render_test(&mut self) -> Result<(), TuiError> {
        self.draw()
    }

    /// Terminal, for buffer inspection (test-only accessor).
    pub(crate) fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

/// Everything a frame needs, borrowed from the app.
struct FrameView<'a> {
    session: &'a TableSession<Record>,
    mode: &'a InputMode,
    cursor: GridCursor,
    notice: Option<&'a Notice>,
    styles: &'a GridStyles,
    areas: FrameAreas,
}

fn render_frame(frame: &mut Frame, view: &FrameView<'_>) {
    let session = view.session;
    let styles = view.styles;
    let areas = view.areas;
    let toolbar = session.toolbar();

    let search_input = match view.mode {
        InputMode::Search(input) => Some(input),
        _ => None,
    };
    frame.render_widget(Toolbar::new(&toolbar, styles).search_input(search_input), areas.toolbar);

    let derived = session.displayed_rows();
    match session.load_state() {
        LoadState::Loading { .. } => frame.render_widget(Skeleton::new(styles), areas.grid),
        LoadState::Failed { message } => frame.render_widget(ErrorPanel::new(message, styles), areas.grid),
        LoadState::Ready => {
            let columns = session.effective_columns();
            let grid = layout_columns(&columns, areas.grid.x, areas.grid.width);
            let window = session.window(derived.rows.len(), view.cursor.scroll, areas.body_height());
            let focused = columns.data_columns().get(view.cursor.column).map(|c| c.key());
            let drag = DragHighlight {
                source: session.reorder().dragging(),
                target: session.reorder().hovered(),
            };
            let widget = GridView::new(&grid, &derived.rows, window, session.state(), styles)
                .scroll_offset(view.cursor.scroll)
                .page_selection(session.page_selection())
                .editing(session.editing())
                .drag(drag)
                .cursor(Some(view.cursor.row), focused);
            frame.render_widget(widget, areas.grid);

            if let (Some(area), Some(row)) = (areas.detail, derived.rows.get(view.cursor.row)) {
                frame.render_widget(DetailPane::new(*row, session.columns()), area);
            }
        }
    }

    let edit_error = session
        .editing()
        .and_then(|cell| cell.last_error.clone())
        .map(Notice::Error);
    let notice = edit_error.as_ref().or(view.notice);
    frame.render_widget(
        Footer::new(session.pagination(), derived.total, styles).notice(notice),
        areas.footer,
    );

    if let InputMode::ColumnMenu { cursor } = view.mode {
        let popup = panels::centered_rect(COLUMN_MENU_WIDTH_PERCENT, COLUMN_MENU_HEIGHT_PERCENT, frame.area());
        frame.render_widget(ColumnMenu::new(&toolbar.column_menu, *cursor, styles), popup);
    }
}

/// Rejections are caller mistakes the UI ignores.
fn report(result: Result<(), Rejection>) {
    if let Err(rejection) = result {
        debug!(%rejection, "interaction rejected");
    }
}

/// Initialize and run the TUI application.
///
/// Handles terminal setup, runs the event loop, and restores the terminal on
/// exit. Logging must be initialized by the caller.
pub fn run(session: TableSession<Record>, source: SimulatedServer, options: ShellOptions) -> Result<(), TuiError> {
    let mut app = TuiApp::new(session, source, options)?;

    // Run the app and ensure cleanup happens even on error
    let result = app.run();
    restore_terminal()?;
    app.into_session().close();

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
