//! Domain-level table actions independent of key bindings.

/// Domain-level actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `TableAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableAction {
    // Row cursor
    /// Move the row cursor up. Default: k/↑
    CursorUp,
    /// Move the row cursor down. Default: j/↓
    CursorDown,
    /// Move the row cursor up by one viewport. Default: Ctrl+u/Page Up
    ScrollPageUp,
    /// Move the row cursor down by one viewport. Default: Ctrl+d/Page Down
    ScrollPageDown,
    /// Jump to the first row. Default: g/Home
    CursorTop,
    /// Jump to the last row. Default: G/End
    CursorBottom,

    // Column cursor
    /// Focus the column to the left. Default: h/←
    ColumnLeft,
    /// Focus the column to the right. Default: l/→
    ColumnRight,
    /// Move the focused column one slot left. Default: H/Shift+←
    MoveColumnLeft,
    /// Move the focused column one slot right. Default: L/Shift+→
    MoveColumnRight,
    /// Sort by the focused column (toggle direction on repeat). Default: o
    SortByColumn,
    /// Open or close the column visibility menu. Default: C
    ToggleColumnMenu,

    // Pagination
    /// Go to the next page. Default: ]
    NextPage,
    /// Go to the previous page. Default: [
    PrevPage,

    // Filters
    /// Focus the search box. Default: /
    StartSearch,
    /// Cycle the status filter through its options. Default: f
    CycleStatusFilter,
    /// Clear search, status and advanced filters. Default: c
    ClearFilters,

    // Rows
    /// Toggle selection of the cursor row. Default: Space
    ToggleSelect,
    /// Toggle selection of every row on the page. Default: a
    TogglePageSelection,
    /// Toggle the cursor row's detail pane. Default: Tab
    ToggleExpand,
    /// Activate the cursor row (row click). Default: Enter
    ActivateRow,
    /// Start editing the focused cell. Default: e
    EditCell,

    // Bulk / export
    /// Run the first registered bulk action over the selection. Default: b
    RunBulkAction,
    /// Export the effective columns to CSV. Default: x
    ExportCsv,
    /// Export the effective columns to JSON. Default: X
    ExportJson,

    // Application
    /// Re-fetch after a data error. Default: r
    Retry,
    /// Exit the application. Default: q/Ctrl+c
    Quit,
}
