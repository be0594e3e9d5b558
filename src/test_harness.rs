//! Acceptance test harness for TUI testing
//!
//! Wraps TuiApp<TestBackend> with methods for simulating user interactions
//! and a controllable clock for debounce and request latency.

use crate::model::{Column, ColumnKey, Record};
use crate::source::{DataSource, SimulatedServer};
use crate::state::{DataMode, TableFeatures, TableSession, TableSessionBuilder};
use crate::view::{ShellOptions, TuiApp};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::json;
use std::time::{Duration, Instant};

/// Convert a ratatui buffer to a string representation for snapshot testing.
///
/// Captures the visual output character by character, preserving layout.
/// Empty lines are removed to keep snapshots clean.
pub(crate) fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let area = buffer.area();
    let mut lines = Vec::new();

    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            let cell = &buffer[(x, y)];
            line.push_str(cell.symbol());
        }
        let trimmed = line.trim_end();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}

/// Employee schema used by the shell tests.
pub(crate) fn roster_columns() -> Vec<Column> {
    let key = |raw: &str| ColumnKey::new(raw).expect("valid key");
    vec![
        Column::new(key("name"), "Name").sortable(),
        Column::new(key("team"), "Team").sortable().read_only(),
        Column::new(key("status"), "Status").sortable(),
        Column::new(key("score"), "Score").sortable().width(7),
    ]
}

/// `count` employees `e1..`, named `Emp{n}`, alternating active and away.
pub(crate) fn roster_rows(count: usize) -> Vec<Record> {
    (1..=count)
        .map(|n| {
            let status = if n % 2 == 0 { "away" } else { "active" };
            serde_json::from_value(json!({
                "id": format!("e{n}"),
                "name": format!("Emp{n}"),
                "team": if n % 3 == 0 { "Ops" } else { "Core" },
                "status": status,
                "score": n,
            }))
            .expect("record")
        })
        .collect()
}

/// Test harness for acceptance testing
pub(crate) struct TableHarness {
    app: TuiApp<TestBackend>,
    now: Instant,
    running: bool,
}

#[allow(dead_code)]
impl TableHarness {
    /// Local table over `server`'s rows at 100x30.
    pub fn local(server: SimulatedServer, features: TableFeatures) -> Self {
        Self::build(server, features, DataMode::Local, ShellOptions::default())
    }

    /// Remote table fetching from `server` with `latency`.
    pub fn remote(server: SimulatedServer, features: TableFeatures, latency: Duration) -> Self {
        let options = ShellOptions {
            latency,
            ..ShellOptions::default()
        };
        Self::build(server, features, DataMode::Remote, options)
    }

    /// Harness with full control over the shell options.
    pub fn build(server: SimulatedServer, features: TableFeatures, mode: DataMode, options: ShellOptions) -> Self {
        let mut builder = TableSessionBuilder::new(roster_columns())
            .features(features)
            .mode(mode)
            .status_options(vec!["active".into(), "away".into()]);
        if mode == DataMode::Local {
            builder = builder.rows(server.rows().to_vec());
        }
        let session = builder.build().expect("valid schema");
        let terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");

        let mut harness = Self {
            app: TuiApp::with_terminal(terminal, session, server, options),
            now: Instant::now(),
            running: true,
        };
        harness.app.service_test(harness.now);
        harness
    }

    /// Send a single key event. Returns true if the app quit.
    pub fn send_key(&mut self, key: KeyCode) -> bool {
        self.send_key_with_mods(key, KeyModifiers::NONE)
    }

    /// Send key with modifiers (e.g., Ctrl+C)
    pub fn send_key_with_mods(&mut self, key: KeyCode, mods: KeyModifiers) -> bool {
        if !self.running {
            return true;
        }
        let quit = self.app.handle_key_test(KeyEvent::new(key, mods), self.now);
        if quit {
            self.running = false;
        } else {
            self.app.service_test(self.now);
        }
        quit
    }

    /// Type text one character at a time.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            let mods = if ch.is_ascii_uppercase() {
                KeyModifiers::SHIFT
            } else {
                KeyModifiers::NONE
            };
            if self.send_key_with_mods(KeyCode::Char(ch), mods) {
                break;
            }
        }
    }

    /// Move the clock forward and run due work.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
        self.app.service_test(self.now);
    }

    /// The app under test.
    pub fn app(&self) -> &TuiApp<TestBackend> {
        &self.app
    }

    /// Shorthand for the app's session.
    pub fn session(&self) -> &TableSession<Record> {
        self.app.session()
    }

    /// Whether the app is still running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Render the current frame to a string.
    pub fn render_to_string(&mut self) -> String {
        self.app
            .render_test()
            .expect("Rendering should succeed in test harness");
        buffer_to_string(self.app.terminal().backend().buffer())
    }

    /// Send a mouse event at the given cell, after a render so hit areas exist.
    pub fn mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        let _ = self.app.render_test();
        self.app.handle_mouse_test(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    /// Left click at the given cell.
    pub fn click_at(&mut self, column: u16, row: u16) {
        self.mouse(MouseEventKind::Down(MouseButton::Left), column, row);
        self.mouse(MouseEventKind::Up(MouseButton::Left), column, row);
    }
}
