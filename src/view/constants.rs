//! Layout dimension constants for TUI rendering.
//!
//! Centralized location for layout-related numeric values so the grid, the
//! mouse hit testing and the tests agree.

/// Height of the toolbar in lines (border + content).
pub const TOOLBAR_HEIGHT: u16 = 3;

/// Height of the header row of the grid.
pub const HEADER_HEIGHT: u16 = 1;

/// Header height when a wrapping header does not fit its column.
pub const WRAPPED_HEADER_HEIGHT: u16 = 2;

/// Height of the footer (pagination summary + status message).
pub const FOOTER_HEIGHT: u16 = 2;

/// Height of the expanded-row detail pane, borders included.
pub const DETAIL_PANE_HEIGHT: u16 = 8;

/// Width of the selection checkbox column (`[x]`).
pub const SELECTION_COLUMN_WIDTH: u16 = 3;

/// Width of the expansion toggle column.
pub const EXPANSION_COLUMN_WIDTH: u16 = 1;

/// Blank cells between adjacent grid columns.
pub const COLUMN_SPACING: u16 = 1;

/// Narrowest a data column is squeezed to.
pub const MIN_DATA_COLUMN_WIDTH: u16 = 6;

/// Width percentage for the column visibility menu popup.
pub const COLUMN_MENU_WIDTH_PERCENT: u16 = 40;

/// Height percentage for the column visibility menu popup.
pub const COLUMN_MENU_HEIGHT_PERCENT: u16 = 60;
