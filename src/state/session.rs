//! Table session: one explicitly constructed table instance.
//!
//! A [`TableSession`] owns the state store and every interaction state machine
//! (coordinator, reorder protocol, inline editor, selection snapshots) for one
//! table. Nothing is shared between sessions; two tables in one process are two
//! sessions.
//!
//! The session never performs I/O. Fetches are queued as [`FetchRequest`]s for
//! the shell to take with [`TableSession::take_fetch`]; saves are returned as
//! [`SaveRequest`]s. Responses come back through [`TableSession::resolve_fetch`]
//! and [`TableSession::complete_save`], keyed by ticket, so late answers for
//! superseded requests are dropped.

use super::coordinator::{Coordinator, DataMode, FetchRequest, FetchTicket, Outcome};
use super::debounce::DEFAULT_SEARCH_DEBOUNCE;
use super::inline_edit::{EditKey, EditKeyOutcome, EditingCell, InlineEditor, SaveOutcome, SaveRequest, SaveTicket};
use super::load_state::LoadState;
use super::reorder::{move_column, ReorderMode, ReorderProtocol};
use super::selection::{self, BulkActions, BulkHandler, PageSelection, SelectionSnapshots};
use super::table_state::{ChangeSet, StateListener, SubscriptionId, TableState, TableStatePatch, TableStore};
use crate::model::{
    Column, ColumnKey, DataError, Filters, Pagination, Rejection, RowId, SaveError, SchemaError, SortSpec,
    TableRow,
};
use crate::view_state::columns::derive_columns_with_order;
use crate::view_state::rows::{filter_rows, filtered_sorted};
use crate::view_state::toolbar::{next_status, status_options};
use crate::view_state::{
    compute_window, derive_rows, ColumnFlags, DerivedRows, EffectiveColumns, ExportDocument, ExportFormat,
    ExportScope, RowHeight, ToolbarFlags, ToolbarModel, VirtualWindow,
};
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Default rows rendered beyond each edge of the viewport.
pub const DEFAULT_OVERSCAN: usize = 3;

// ===== Configuration =====

/// Feature flags and tuning for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFeatures {
    /// Show the selection checkbox column.
    pub selectable: bool,
    /// Show the expansion toggle column.
    pub expandable: bool,
    /// Allow inline cell editing.
    pub editable: bool,
    /// Paginate rows. When false every matching row is shown.
    pub paginated: bool,
    /// Render only the visible window of rows.
    pub virtualized: bool,
    /// Toolbar controls.
    pub toolbar: ToolbarFlags,
    /// When a column drag commits.
    pub reorder_mode: ReorderMode,
    /// Initial rows per page.
    pub page_size: usize,
    /// Extra rows rendered above and below the viewport.
    pub overscan: usize,
    /// Fixed row height.
    pub row_height: RowHeight,
    /// Quiet period before typed search text commits.
    pub search_debounce: Duration,
}

impl Default for TableFeatures {
    fn default() -> Self {
        Self {
            selectable: true,
            expandable: true,
            editable: true,
            paginated: true,
            virtualized: true,
            toolbar: ToolbarFlags::default(),
            reorder_mode: ReorderMode::default(),
            page_size: DEFAULT_PAGE_SIZE,
            overscan: DEFAULT_OVERSCAN,
            row_height: RowHeight::ONE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl TableFeatures {
    /// Synthetic column flags.
    pub fn column_flags(&self) -> ColumnFlags {
        ColumnFlags {
            selectable: self.selectable,
            expandable: self.expandable,
        }
    }
}

/// Notifications for the caller.
///
/// Every method has an empty default, so implementors pick what they need.
pub trait TableCallbacks<R> {
    /// Page or page size changed.
    fn on_pagination_change(&mut self, _pagination: &Pagination) {}

    /// Sort changed.
    fn on_sort_change(&mut self, _sort: Option<&SortSpec>) {}

    /// Any filter changed.
    fn on_filter_change(&mut self, _filters: &Filters) {}

    /// A row was activated.
    fn on_row_click(&mut self, _row: &R) {}

    /// Selection changed; receives every selected row, across pages.
    fn on_selection_change(&mut self, _rows: &[R]) {}

    /// The user asked to retry after a data error.
    fn on_retry(&mut self) {}

    /// An export was produced.
    fn on_export(&mut self, _format: ExportFormat, _rows: &[R], _columns: &[&Column]) {}
}

/// Callbacks that ignore everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallbacks;

impl<R> TableCallbacks<R> for NoCallbacks {}

/// Rows and totals returned by the collaborator for one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse<R> {
    /// The requested page of rows, already sorted and filtered.
    pub rows: Vec<R>,
    /// Where those rows sit in the full result.
    pub pagination: Pagination,
}

/// Check that `columns` can back a table: non-empty, keys unique.
pub fn validate_schema(columns: &[Column]) -> Result<(), SchemaError> {
    if columns.is_empty() {
        return Err(SchemaError::Empty);
    }
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.key()) {
            return Err(SchemaError::DuplicateKey(column.key().clone()));
        }
    }
    Ok(())
}

// ===== Builder =====

/// Builds a [`TableSession`].
pub struct TableSessionBuilder<R> {
    columns: Vec<Column>,
    rows: Vec<R>,
    features: TableFeatures,
    filters: Filters,
    mode: DataMode,
    callbacks: Box<dyn TableCallbacks<R>>,
    bulk: BulkActions<R>,
    status_options: Option<Vec<String>>,
}

impl<R: TableRow + Clone + 'static> TableSessionBuilder<R> {
    /// Start from a column schema.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            features: TableFeatures::default(),
            filters: Filters::new(),
            mode: DataMode::Local,
            callbacks: Box::new(NoCallbacks),
            bulk: BulkActions::new(),
            status_options: None,
        }
    }

    /// Initial rows (local mode).
    pub fn rows(mut self, rows: Vec<R>) -> Self {
        self.rows = rows;
        self
    }

    /// Feature flags.
    pub fn features(mut self, features: TableFeatures) -> Self {
        self.features = features;
        self
    }

    /// Filters applied from the start.
    pub fn initial_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Where rows come from.
    pub fn mode(mut self, mode: DataMode) -> Self {
        self.mode = mode;
        self
    }

    /// Caller notifications.
    pub fn callbacks(mut self, callbacks: impl TableCallbacks<R> + 'static) -> Self {
        self.callbacks = Box::new(callbacks);
        self
    }

    /// Register a named bulk action.
    pub fn bulk_action(mut self, name: impl Into<String>, handler: BulkHandler<R>) -> Self {
        self.bulk.register(name, handler);
        self
    }

    /// Fixed status choices. Without this, choices are the distinct statuses
    /// of the loaded rows.
    pub fn status_options(mut self, options: Vec<String>) -> Self {
        self.status_options = Some(options);
        self
    }

    /// Validate the schema and create the session.
    ///
    /// In remote mode the initial fetch is queued immediately.
    pub fn build(self) -> Result<TableSession<R>, SchemaError> {
        validate_schema(&self.columns)?;
        let features = self.features;
        let store = TableStore::new(&self.columns, self.filters, features.page_size);

        let mut session = TableSession {
            coordinator: Coordinator::new(self.mode, features.search_debounce),
            reorder: ReorderProtocol::new(features.reorder_mode),
            editor: InlineEditor::new(features.editable),
            snapshots: SelectionSnapshots::new(),
            bulk: self.bulk,
            callbacks: self.callbacks,
            rows: self.rows,
            remote_pagination: None,
            load: LoadState::Ready,
            pending_fetch: None,
            status_options: self.status_options,
            columns: self.columns,
            features,
            store,
        };

        info!(
            columns = session.columns.len(),
            rows = session.rows.len(),
            mode = ?session.coordinator.mode(),
            "table session created"
        );
        if let Some(request) = session.coordinator.request_fetch(session.store.state()) {
            session.queue_fetch(request);
        }
        Ok(session)
    }
}

impl<R> fmt::Debug for TableSessionBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSessionBuilder")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("features", &self.features)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

// ===== TableSession =====

/// One table: state store, interaction state machines, and loaded rows.
///
/// # Row ownership
///
/// In local mode the session holds the whole collection and derives the
/// visible page itself. In remote mode it holds only the page the collaborator
/// returned. Either way the caller replaces rows wholesale; the session never
/// mutates a row.
///
/// # Interactions
///
/// Each interaction either commits one atomic store update or is rejected
/// with a [`Rejection`] and changes nothing. Callbacks fire after the update,
/// only for fields that actually changed.
pub struct TableSession<R> {
    columns: Vec<Column>,
    features: TableFeatures,
    store: TableStore,
    coordinator: Coordinator,
    reorder: ReorderProtocol,
    editor: InlineEditor,
    snapshots: SelectionSnapshots<R>,
    bulk: BulkActions<R>,
    callbacks: Box<dyn TableCallbacks<R>>,
    rows: Vec<R>,
    remote_pagination: Option<Pagination>,
    load: LoadState,
    pending_fetch: Option<FetchRequest>,
    status_options: Option<Vec<String>>,
}

impl<R: TableRow + Clone> TableSession<R> {
    // ===== Accessors =====

    /// Column schema.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Feature flags.
    pub fn features(&self) -> &TableFeatures {
        &self.features
    }

    /// Committed table state.
    pub fn state(&self) -> &TableState {
        self.store.state()
    }

    /// Store revision; bumps on every committed change.
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Data mode.
    pub fn mode(&self) -> DataMode {
        self.coordinator.mode()
    }

    /// Loading / error state.
    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Loaded rows: the whole collection locally, the current page remotely.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// The inline editor.
    pub fn editor(&self) -> &InlineEditor {
        &self.editor
    }

    /// The cell in edit mode, if any.
    pub fn editing(&self) -> Option<&EditingCell> {
        self.editor.editing()
    }

    /// The reorder protocol (drag source and hover target).
    pub fn reorder(&self) -> &ReorderProtocol {
        &self.reorder
    }

    /// Search text still waiting on its debounce.
    pub fn pending_search(&self) -> Option<&str> {
        self.coordinator.pending_search()
    }

    /// Time until the pending search commits.
    pub fn search_due_in(&self, now: Instant) -> Option<Duration> {
        self.coordinator.search_due_in(now)
    }

    /// Names of the registered bulk actions.
    pub fn bulk_action_names(&self) -> impl Iterator<Item = &str> {
        self.bulk.names()
    }

    // ===== Subscriptions =====

    /// Observe committed state changes.
    pub fn subscribe(&mut self, listener: StateListener) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Stop observing. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // ===== Derived views =====

    /// Effective columns in display order, including an uncommitted drag preview.
    pub fn effective_columns(&self) -> EffectiveColumns<'_> {
        effective(&self.columns, &self.reorder, self.store.state(), &self.features)
    }

    /// Rows to display for the current state.
    pub fn displayed_rows(&self) -> DerivedRows<'_, R> {
        let state = self.store.state();
        match self.coordinator.mode() {
            DataMode::Local => derive_rows(
                &self.rows,
                &self.columns,
                state.filters(),
                state.sort(),
                self.features.paginated.then(|| state.page()),
            ),
            DataMode::Remote => DerivedRows {
                rows: self.rows.iter().collect(),
                total: self.remote_pagination.map_or(self.rows.len(), |p| p.total()),
                pagination: self.pagination(),
            },
        }
    }

    /// Page descriptor for the current request, or `None` when unpaginated.
    pub fn pagination(&self) -> Option<Pagination> {
        if !self.features.paginated {
            return None;
        }
        let request = self.store.state().page();
        let total = match self.coordinator.mode() {
            DataMode::Local => filter_rows(&self.rows, &self.columns, self.store.state().filters()).len(),
            DataMode::Remote => self.remote_pagination.map_or(self.rows.len(), |p| p.total()),
        };
        Some(Pagination::for_request(request, total))
    }

    /// Row window for a scroll position. Without virtualization the window
    /// covers every row.
    pub fn window(&self, row_count: usize, scroll_offset: usize, viewport_height: usize) -> VirtualWindow {
        let height = self.features.row_height;
        if self.features.virtualized {
            compute_window(row_count, height, scroll_offset, viewport_height, self.features.overscan)
        } else {
            compute_window(row_count, height, 0, row_count.saturating_mul(height.get()), 0)
        }
    }

    /// Status filter choices.
    pub fn status_options(&self) -> Vec<String> {
        match &self.status_options {
            Some(options) => options.clone(),
            None => status_options(&self.rows),
        }
    }

    /// Toolbar snapshot.
    pub fn toolbar(&self) -> ToolbarModel {
        ToolbarModel::build(
            &self.columns,
            self.store.state(),
            self.status_options(),
            self.coordinator.pending_search(),
            self.features.toolbar,
        )
    }

    /// Ids of the rows on the current page, in display order.
    pub fn page_row_ids(&self) -> Vec<RowId> {
        self.displayed_rows().rows.iter().map(|row| row.id().clone()).collect()
    }

    /// Header checkbox state for the current page.
    pub fn page_selection(&self) -> PageSelection {
        selection::page_selection(self.store.state().selected_rows(), &self.page_row_ids())
    }

    // ===== Data =====

    /// Replace the row collection (local mode, or after a save).
    pub fn set_rows(&mut self, rows: Vec<R>) {
        debug!(rows = rows.len(), "rows replaced");
        self.rows = rows;
        self.snapshots.sync(self.store.state().selected_rows(), &self.rows);
        self.reconcile_page();
    }

    /// Take the queued fetch request, if any.
    pub fn take_fetch(&mut self) -> Option<FetchRequest> {
        self.pending_fetch.take()
    }

    /// Apply the collaborator's answer to `ticket`.
    ///
    /// Returns false, changing nothing, when the ticket has been superseded.
    pub fn resolve_fetch(&mut self, ticket: FetchTicket, result: Result<FetchResponse<R>, DataError>) -> bool {
        if !self.coordinator.resolve(ticket) {
            return false;
        }
        match result {
            Ok(response) => {
                debug!(ticket = ticket.get(), rows = response.rows.len(), "fetch resolved");
                self.rows = response.rows;
                self.remote_pagination = Some(response.pagination);
                self.snapshots.sync(self.store.state().selected_rows(), &self.rows);
                self.load = LoadState::Ready;
                self.reconcile_page();
            }
            Err(error) => {
                warn!(ticket = ticket.get(), %error, "fetch failed");
                self.load = LoadState::failed(&error);
            }
        }
        true
    }

    /// Retry after a data error: notifies the caller and, in remote mode,
    /// re-issues the last query.
    pub fn retry(&mut self) {
        info!("retry requested");
        self.callbacks.on_retry();
        if let Some(request) = self.coordinator.retry(self.store.state()) {
            self.queue_fetch(request);
        }
    }

    /// Re-fetch the rows on screen in remote mode, e.g. after a committed save.
    /// Does nothing locally.
    pub fn refresh(&mut self) {
        if let Some(request) = self.coordinator.retry(self.store.state()) {
            debug!(ticket = request.ticket.get(), "refresh requested");
            self.queue_fetch(request);
        }
    }

    // ===== Sort, search and filters =====

    /// Header click on `key`.
    ///
    /// Ignored with [`Rejection::DragInProgress`] while a column is being
    /// dragged, so the click that ends a drag never sorts.
    pub fn click_sort(&mut self, key: &ColumnKey) -> Result<(), Rejection> {
        if self.reorder.dragging().is_some() {
            return Err(Rejection::DragInProgress);
        }
        let outcome = self.coordinator.click_sort(&mut self.store, key)?;
        self.apply(outcome);
        Ok(())
    }

    /// Record typed search text; it commits after the debounce via [`Self::tick`].
    pub fn type_search(&mut self, text: impl Into<String>, now: Instant) {
        self.coordinator.type_search(text, now);
    }

    /// Commit debounced search text whose quiet period has elapsed.
    pub fn tick(&mut self, now: Instant) -> Result<(), Rejection> {
        if let Some(outcome) = self.coordinator.tick(&mut self.store, now)? {
            self.apply(outcome);
        }
        Ok(())
    }

    /// Commit pending search text immediately.
    pub fn submit_search(&mut self) -> Result<(), Rejection> {
        if let Some(outcome) = self.coordinator.flush_search(&mut self.store)? {
            self.apply(outcome);
        }
        Ok(())
    }

    /// Set or clear the status filter.
    pub fn set_status(&mut self, status: Option<&str>) -> Result<(), Rejection> {
        let outcome = self.coordinator.set_status(&mut self.store, status)?;
        self.apply(outcome);
        Ok(())
    }

    /// Advance the status filter to the next option (wrapping through "all").
    pub fn cycle_status(&mut self) -> Result<(), Rejection> {
        let options = self.status_options();
        let next = next_status(&options, self.store.state().filters().status());
        self.set_status(next.as_deref())
    }

    /// Set or clear an advanced filter.
    pub fn set_filter(&mut self, name: &str, value: &str) -> Result<(), Rejection> {
        let outcome = self.coordinator.set_filter(&mut self.store, name, value)?;
        self.apply(outcome);
        Ok(())
    }

    /// Clear every filter.
    pub fn clear_filters(&mut self) -> Result<(), Rejection> {
        let outcome = self.coordinator.clear_filters(&mut self.store)?;
        self.apply(outcome);
        Ok(())
    }

    // ===== Pagination =====

    /// Go to `page`, clamped into range.
    pub fn go_to_page(&mut self, page: usize) -> Result<(), Rejection> {
        let current = self.pagination().ok_or(Rejection::FeatureDisabled("pagination"))?;
        let outcome = self.coordinator.go_to_page(&mut self.store, &current, page)?;
        self.apply(outcome);
        Ok(())
    }

    /// Next page; no-op on the last page.
    pub fn next_page(&mut self) -> Result<(), Rejection> {
        let page = self.store.state().page().page();
        self.go_to_page(page.saturating_add(1))
    }

    /// Previous page; no-op on the first page.
    pub fn prev_page(&mut self) -> Result<(), Rejection> {
        let page = self.store.state().page().page();
        self.go_to_page(page.saturating_sub(1))
    }

    /// Change rows per page and return to page 1.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), Rejection> {
        if !self.features.paginated {
            return Err(Rejection::FeatureDisabled("pagination"));
        }
        let outcome = self.coordinator.set_page_size(&mut self.store, page_size)?;
        self.apply(outcome);
        Ok(())
    }

    // ===== Columns =====

    /// Show or hide a column. Hiding the last visible column is rejected.
    pub fn toggle_column(&mut self, key: &ColumnKey) -> Result<(), Rejection> {
        let mut visible = self.store.state().visible_columns().clone();
        if !visible.remove(key) {
            visible.insert(key.clone());
        }
        let changes = self.store.update(TableStatePatch::new().visible_columns(visible))?;
        self.notify(changes);
        Ok(())
    }

    /// Make every column visible again.
    pub fn show_all_columns(&mut self) -> Result<(), Rejection> {
        let visible = self.columns.iter().map(|c| c.key().clone()).collect();
        let changes = self.store.update(TableStatePatch::new().visible_columns(visible))?;
        self.notify(changes);
        Ok(())
    }

    /// Begin dragging the header of `key`.
    pub fn drag_start(&mut self, key: &ColumnKey) -> Result<(), Rejection> {
        self.reorder.drag_start(self.store.state(), key)
    }

    /// Drag enters the header of `target`.
    pub fn drag_over(&mut self, target: &ColumnKey) -> Result<(), Rejection> {
        let changes = self.reorder.drag_over(&mut self.store, target)?;
        self.notify(changes);
        Ok(())
    }

    /// Drag leaves the hovered header.
    pub fn drag_leave(&mut self) {
        self.reorder.drag_leave();
    }

    /// Drop on the hovered header.
    pub fn drop_column(&mut self) -> Result<(), Rejection> {
        let changes = self.reorder.drop_column(&mut self.store)?;
        self.notify(changes);
        Ok(())
    }

    /// Drag ended (dropped or abandoned).
    pub fn drag_end(&mut self) {
        self.reorder.drag_end();
    }

    /// Keyboard reorder: move `key` by `delta` visible positions.
    pub fn move_column(&mut self, key: &ColumnKey, delta: isize) -> Result<(), Rejection> {
        let changes = move_column(&mut self.store, key, delta)?;
        self.notify(changes);
        Ok(())
    }

    // ===== Inline editing =====

    /// Edit the data cell (`row_id`, `key`). The column must be visible.
    pub fn start_edit(&mut self, row_id: &RowId, key: &ColumnKey) -> Result<(), Rejection> {
        let columns = effective(&self.columns, &self.reorder, self.store.state(), &self.features);
        let index = columns
            .iter()
            .position(|c| c.key() == Some(key))
            .ok_or_else(|| Rejection::UnknownColumn(key.clone()))?;
        self.start_edit_at(row_id, index)
    }

    /// Edit the cell at display position `index` of the effective columns.
    ///
    /// Synthetic positions are rejected with [`Rejection::NotEditable`].
    pub fn start_edit_at(&mut self, row_id: &RowId, index: usize) -> Result<(), Rejection> {
        let columns = effective(&self.columns, &self.reorder, self.store.state(), &self.features);
        let target = columns.get(index).ok_or(Rejection::ColumnOutOfRange(index))?;
        let row = self
            .rows
            .iter()
            .find(|row| row.id() == row_id)
            .ok_or_else(|| Rejection::UnknownRow(row_id.clone()))?;
        self.editor.start_edit(row, target)?;
        Ok(())
    }

    /// Route a key to the editor. `Enter` returns the save to dispatch.
    pub fn edit_key(&mut self, key: EditKey) -> Result<EditKeyOutcome, Rejection> {
        self.editor.handle_key(key)
    }

    /// Start saving the buffer.
    pub fn save_edit(&mut self) -> Result<SaveRequest, Rejection> {
        self.editor.begin_save()
    }

    /// Apply the save handler's result.
    pub fn complete_save(&mut self, ticket: SaveTicket, result: Result<(), SaveError>) -> SaveOutcome {
        let outcome = self.editor.complete_save(ticket, result);
        if let SaveOutcome::Committed(request) = &outcome {
            info!(row = %request.row_id, column = %request.column_key, "cell saved");
        }
        outcome
    }

    /// Discard the edit.
    pub fn cancel_edit(&mut self) {
        if let Some(cell) = self.editor.cancel() {
            debug!(row = %cell.row_id, column = %cell.column_key, "edit cancelled");
        }
    }

    // ===== Selection and expansion =====

    /// Toggle selection of one row.
    pub fn toggle_row(&mut self, id: &RowId) -> Result<(), Rejection> {
        self.require_selectable()?;
        let next = selection::toggle(self.store.state().selected_rows(), id);
        self.write_selection(next)
    }

    /// Header checkbox: select the rest of the page, or clear it when full.
    pub fn toggle_page_selection(&mut self) -> Result<(), Rejection> {
        self.require_selectable()?;
        let page = self.page_row_ids();
        let next = selection::toggle_page(self.store.state().selected_rows(), &page);
        self.write_selection(next)
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) -> Result<(), Rejection> {
        self.write_selection(HashSet::new())
    }

    /// Every selected row, including rows on pages no longer loaded.
    pub fn selected_rows(&self) -> Vec<R> {
        self.snapshots
            .materialize(self.store.state().selected_rows(), &self.rows)
    }

    /// Expand or collapse one row.
    pub fn toggle_expanded(&mut self, id: &RowId) -> Result<(), Rejection> {
        if !self.features.expandable {
            return Err(Rejection::FeatureDisabled("expansion"));
        }
        let next = selection::toggle(self.store.state().expanded_rows(), id);
        let changes = self.store.update(TableStatePatch::new().expanded_rows(next))?;
        self.notify(changes);
        Ok(())
    }

    /// Activate a row. Suppressed (returns false) while one of its cells is
    /// being edited.
    pub fn click_row(&mut self, id: &RowId) -> Result<bool, Rejection> {
        if self.editor.is_editing_row(id) {
            debug!(row = %id, "row click suppressed during edit");
            return Ok(false);
        }
        let row = self
            .rows
            .iter()
            .find(|row| row.id() == id)
            .ok_or_else(|| Rejection::UnknownRow(id.clone()))?;
        self.callbacks.on_row_click(row);
        Ok(true)
    }

    /// Run a bulk action over the selected rows. Returns how many rows it saw.
    pub fn run_bulk_action(&mut self, name: &str) -> Result<usize, Rejection> {
        let rows = self.selected_rows();
        self.bulk.run(name, &rows)?;
        info!(action = name, rows = rows.len(), "bulk action run");
        Ok(rows.len())
    }

    // ===== Export =====

    /// Export over the effective data columns.
    ///
    /// `All` covers every row matching the filters in display order, without
    /// pagination; in remote mode that is the loaded page. `Selected` covers
    /// the selection across pages.
    pub fn export(&mut self, format: ExportFormat, scope: ExportScope) -> ExportDocument {
        let rows: Vec<R> = match scope {
            ExportScope::Selected => self.selected_rows(),
            ExportScope::All => match self.coordinator.mode() {
                DataMode::Local => {
                    let state = self.store.state();
                    filtered_sorted(&self.rows, &self.columns, state.filters(), state.sort())
                        .into_iter()
                        .cloned()
                        .collect()
                }
                DataMode::Remote => self.rows.clone(),
            },
        };

        let columns = effective(&self.columns, &self.reorder, self.store.state(), &self.features);
        let refs: Vec<&R> = rows.iter().collect();
        let document = ExportDocument::build(format, &columns, &refs);
        let data_columns = columns.data_columns().to_vec();
        info!(%format, rows = document.len(), "export built");
        self.callbacks.on_export(format, &rows, &data_columns);
        document
    }

    // ===== Lifecycle =====

    /// Tear the session down.
    pub fn close(self) {
        info!(revision = self.store.revision(), "table session closed");
    }

    // ===== Internals =====

    fn require_selectable(&self) -> Result<(), Rejection> {
        if self.features.selectable {
            Ok(())
        } else {
            Err(Rejection::FeatureDisabled("selection"))
        }
    }

    fn write_selection(&mut self, selected: HashSet<RowId>) -> Result<(), Rejection> {
        let changes = self.store.update(TableStatePatch::new().selected_rows(selected))?;
        self.notify(changes);
        Ok(())
    }

    fn queue_fetch(&mut self, request: FetchRequest) {
        self.load = LoadState::loading(request.ticket);
        self.pending_fetch = Some(request);
    }

    /// Write the clamped page back when the row count shrank under the stored
    /// request. In remote mode this re-fetches the clamped page.
    fn reconcile_page(&mut self) {
        let Some(pagination) = self.pagination() else {
            return;
        };
        let stored = self.store.state().page().page();
        if pagination.page() == stored {
            return;
        }
        debug!(stored, clamped = pagination.page(), "page clamped to new total");
        match self.coordinator.go_to_page(&mut self.store, &pagination, pagination.page()) {
            Ok(outcome) => self.apply(outcome),
            Err(rejection) => debug!(%rejection, "page clamp rejected"),
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        if let Some(request) = outcome.fetch {
            self.queue_fetch(request);
        }
        self.notify(outcome.changes);
    }

    fn notify(&mut self, changes: ChangeSet) {
        if !changes.any() {
            return;
        }
        if changes.sort {
            self.callbacks.on_sort_change(self.store.state().sort());
        }
        if changes.filters {
            self.callbacks.on_filter_change(self.store.state().filters());
        }
        if changes.page || changes.filters {
            if let Some(pagination) = self.pagination() {
                self.callbacks.on_pagination_change(&pagination);
            }
        }
        if changes.selection {
            self.snapshots.sync(self.store.state().selected_rows(), &self.rows);
            let rows = self.selected_rows();
            self.callbacks.on_selection_change(&rows);
        }
    }
}

/// Effective columns from individual session fields, so callers can keep
/// mutable borrows of the other fields.
fn effective<'a>(
    columns: &'a [Column],
    reorder: &'a ReorderProtocol,
    state: &'a TableState,
    features: &TableFeatures,
) -> EffectiveColumns<'a> {
    derive_columns_with_order(
        columns,
        reorder.display_order(state),
        state.visible_columns(),
        features.column_flags(),
    )
}

impl<R> fmt::Debug for TableSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSession")
            .field("columns", &self.columns)
            .field("features", &self.features)
            .field("store", &self.store)
            .field("rows", &self.rows.len())
            .field("load", &self.load)
            .finish_non_exhaustive()
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
