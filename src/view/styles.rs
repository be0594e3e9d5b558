//! Grid styling configuration.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== GridStyles =====

/// Styles for every part of the grid.
///
/// With colors disabled, emphasis falls back to modifiers (bold, reversed) so
/// the cursor and header stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStyles {
    /// Header row.
    pub header: Style,
    /// Header cell of the sorted column.
    pub sorted_header: Style,
    /// Header cell being dragged.
    pub dragged_header: Style,
    /// Header cell under a drag.
    pub drop_target: Style,
    /// Header cell with keyboard focus.
    pub focused_header: Style,
    /// Row under the cursor.
    pub cursor_row: Style,
    /// Selected row.
    pub selected_row: Style,
    /// Cell in edit mode.
    pub editing_cell: Style,
    /// Text cursor inside an input.
    pub text_cursor: Style,
    /// Loading placeholder bars.
    pub skeleton: Style,
    /// Error text.
    pub error: Style,
    /// Secondary text (hints, empty states).
    pub muted: Style,
}

impl GridStyles {
    /// Styles honoring `config`.
    pub fn with_color_config(config: ColorConfig) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let reversed = Style::default().add_modifier(Modifier::REVERSED);
        if config.colors_enabled() {
            Self {
                header: bold.fg(Color::Cyan),
                sorted_header: bold.fg(Color::Yellow),
                dragged_header: bold.fg(Color::Black).bg(Color::Magenta),
                drop_target: bold.fg(Color::Black).bg(Color::Cyan),
                focused_header: bold.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
                cursor_row: Style::default().bg(Color::DarkGray),
                selected_row: Style::default().fg(Color::Green),
                editing_cell: Style::default().fg(Color::Black).bg(Color::Yellow),
                text_cursor: bold.fg(Color::Black).bg(Color::White),
                skeleton: Style::default().fg(Color::DarkGray),
                error: Style::default().fg(Color::Red),
                muted: Style::default().fg(Color::Gray),
            }
        } else {
            Self {
                header: bold,
                sorted_header: bold.add_modifier(Modifier::UNDERLINED),
                dragged_header: reversed,
                drop_target: reversed.add_modifier(Modifier::BOLD),
                focused_header: bold.add_modifier(Modifier::UNDERLINED),
                cursor_row: reversed,
                selected_row: bold,
                editing_cell: Style::default().add_modifier(Modifier::UNDERLINED),
                text_cursor: reversed,
                skeleton: Style::default(),
                error: bold,
                muted: Style::default(),
            }
        }
    }
}

impl Default for GridStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(no_color)]
    fn color_config_respects_no_color_flag() {
        assert!(!ColorConfig::from_env_and_args(true).colors_enabled());
    }

    #[test]
    #[serial(no_color)]
    fn color_config_respects_no_color_env_var() {
        std::env::set_var("NO_COLOR", "1");
        let config = ColorConfig::from_env_and_args(false);
        std::env::remove_var("NO_COLOR");
        assert!(!config.colors_enabled());
    }

    #[test]
    #[serial(no_color)]
    fn color_config_enables_colors_by_default() {
        std::env::remove_var("NO_COLOR");
        assert!(ColorConfig::from_env_and_args(false).colors_enabled());
    }

    #[test]
    fn disabled_colors_use_no_foreground() {
        let styles = GridStyles::with_color_config(ColorConfig { enabled: false });
        assert_eq!(styles.header.fg, None);
        assert_eq!(styles.error.fg, None);
        assert!(styles.cursor_row.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn cursor_and_selection_are_distinct() {
        let styles = GridStyles::with_color_config(ColorConfig { enabled: true });
        assert_ne!(styles.cursor_row, styles.selected_row);
        assert_ne!(styles.dragged_header, styles.drop_target);
    }
}
