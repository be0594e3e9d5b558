//! Table state store.
//!
//! [`TableStore`] is the single mutation point for a table instance. Every write
//! goes through [`TableStore::update`], which validates the whole patch first and
//! then applies it in one step: either every key in the patch changes or none do.
//! Registered listeners are notified synchronously after each committed change.

use crate::model::{
    Column, ColumnKey, Filters, PageRequest, Rejection, RowId, SortSpec,
};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

// ===== TableState =====

/// Authoritative per-table state.
///
/// # Invariants
/// - `column_order` is a permutation of the schema's column keys, independent of
///   `visible_columns` (hiding a column keeps its slot so re-showing restores it)
/// - `visible_columns` is a non-empty subset of the schema keys
/// - `sort`, when set, names a sortable schema column
/// - `selected_rows` / `expanded_rows` may hold ids that are not currently loaded
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    sort: Option<SortSpec>,
    filters: Filters,
    column_order: Vec<ColumnKey>,
    visible_columns: HashSet<ColumnKey>,
    selected_rows: HashSet<RowId>,
    expanded_rows: HashSet<RowId>,
    page: PageRequest,
}

impl TableState {
    /// Active sort, if any.
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Active filters.
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Full column order, hidden columns included.
    pub fn column_order(&self) -> &[ColumnKey] {
        &self.column_order
    }

    /// Visible column keys.
    pub fn visible_columns(&self) -> &HashSet<ColumnKey> {
        &self.visible_columns
    }

    /// Whether a column is visible.
    pub fn is_visible(&self, key: &ColumnKey) -> bool {
        self.visible_columns.contains(key)
    }

    /// Selected row ids.
    pub fn selected_rows(&self) -> &HashSet<RowId> {
        &self.selected_rows
    }

    /// Whether a row is selected.
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected_rows.contains(id)
    }

    /// Expanded row ids.
    pub fn expanded_rows(&self) -> &HashSet<RowId> {
        &self.expanded_rows
    }

    /// Whether a row is expanded.
    pub fn is_expanded(&self, id: &RowId) -> bool {
        self.expanded_rows.contains(id)
    }

    /// Requested page.
    pub fn page(&self) -> PageRequest {
        self.page
    }
}

// ===== TableStatePatch =====

/// Partial update: `Some` fields replace the matching state field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableStatePatch {
    /// New sort (`Some(None)` clears it).
    pub sort: Option<Option<SortSpec>>,
    /// New filter set.
    pub filters: Option<Filters>,
    /// New column order.
    pub column_order: Option<Vec<ColumnKey>>,
    /// New visible set.
    pub visible_columns: Option<HashSet<ColumnKey>>,
    /// New selection.
    pub selected_rows: Option<HashSet<RowId>>,
    /// New expansion set.
    pub expanded_rows: Option<HashSet<RowId>>,
    /// New page request.
    pub page: Option<PageRequest>,
}

impl TableStatePatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sort.
    pub fn sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Replace the filters.
    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Replace the column order.
    pub fn column_order(mut self, order: Vec<ColumnKey>) -> Self {
        self.column_order = Some(order);
        self
    }

    /// Replace the visible set.
    pub fn visible_columns(mut self, visible: HashSet<ColumnKey>) -> Self {
        self.visible_columns = Some(visible);
        self
    }

    /// Replace the selection.
    pub fn selected_rows(mut self, selected: HashSet<RowId>) -> Self {
        self.selected_rows = Some(selected);
        self
    }

    /// Replace the expansion set.
    pub fn expanded_rows(mut self, expanded: HashSet<RowId>) -> Self {
        self.expanded_rows = Some(expanded);
        self
    }

    /// Replace the page request.
    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// True when the patch would not touch anything.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ===== ChangeSet =====

/// Which state fields a committed update actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeSet {
    /// Sort changed.
    pub sort: bool,
    /// Filters changed.
    pub filters: bool,
    /// Column order changed.
    pub column_order: bool,
    /// Column visibility changed.
    pub visible_columns: bool,
    /// Selection changed.
    pub selection: bool,
    /// Expansion changed.
    pub expansion: bool,
    /// Page request changed.
    pub page: bool,
}

impl ChangeSet {
    /// True if anything changed.
    pub fn any(&self) -> bool {
        self.sort
            || self.filters
            || self.column_order
            || self.visible_columns
            || self.selection
            || self.expansion
            || self.page
    }

    /// True if the derived row set (filter/sort/page) is affected.
    pub fn affects_rows(&self) -> bool {
        self.sort || self.filters || self.page
    }

    /// True if the effective column list is affected.
    pub fn affects_columns(&self) -> bool {
        self.column_order || self.visible_columns
    }
}

// ===== TableStore =====

/// Handle returned by [`TableStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked after every committed update.
pub type StateListener = Box<dyn FnMut(&TableState, ChangeSet)>;

/// Schema facts the store validates against.
#[derive(Debug, Clone)]
struct StoreSchema {
    keys: Vec<ColumnKey>,
    sortable: HashSet<ColumnKey>,
}

impl StoreSchema {
    fn from_columns(columns: &[Column]) -> Self {
        Self {
            keys: columns.iter().map(|c| c.key().clone()).collect(),
            sortable: columns
                .iter()
                .filter(|c| c.is_sortable())
                .map(|c| c.key().clone())
                .collect(),
        }
    }

    fn contains(&self, key: &ColumnKey) -> bool {
        self.keys.contains(key)
    }

    fn is_permutation(&self, order: &[ColumnKey]) -> bool {
        if order.len() != self.keys.len() {
            return false;
        }
        let unique: HashSet<&ColumnKey> = order.iter().collect();
        unique.len() == order.len() && order.iter().all(|k| self.contains(k))
    }
}

/// The single authoritative state object for one table instance.
pub struct TableStore {
    schema: StoreSchema,
    state: TableState,
    revision: u64,
    listeners: Vec<(SubscriptionId, StateListener)>,
    next_subscription: u64,
}

impl TableStore {
    /// Create a store for `columns` with every column visible in schema order.
    ///
    /// The schema is assumed valid (non-empty, unique keys); sessions check it
    /// before constructing a store.
    pub fn new(columns: &[Column], initial_filters: Filters, page_size: usize) -> Self {
        let schema = StoreSchema::from_columns(columns);
        let state = TableState {
            sort: None,
            filters: initial_filters,
            column_order: schema.keys.clone(),
            visible_columns: schema.keys.iter().cloned().collect(),
            selected_rows: HashSet::new(),
            expanded_rows: HashSet::new(),
            page: PageRequest::first(page_size),
        };
        Self {
            schema,
            state,
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Number of committed updates that changed something.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a listener. It runs after every committed change.
    pub fn subscribe(&mut self, listener: StateListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Apply a partial update atomically.
    ///
    /// The whole patch is validated before anything is written. On rejection the
    /// prior state is retained untouched and no listener runs.
    pub fn update(&mut self, patch: TableStatePatch) -> Result<ChangeSet, Rejection> {
        if let Err(rejection) = self.validate(&patch) {
            debug!(%rejection, "table state update rejected");
            return Err(rejection);
        }

        let mut changes = ChangeSet::default();
        let state = &mut self.state;

        if let Some(sort) = patch.sort {
            changes.sort = state.sort != sort;
            state.sort = sort;
        }
        if let Some(filters) = patch.filters {
            changes.filters = state.filters != filters;
            state.filters = filters;
        }
        if let Some(order) = patch.column_order {
            changes.column_order = state.column_order != order;
            state.column_order = order;
        }
        if let Some(visible) = patch.visible_columns {
            changes.visible_columns = state.visible_columns != visible;
            state.visible_columns = visible;
        }
        if let Some(selected) = patch.selected_rows {
            changes.selection = state.selected_rows != selected;
            state.selected_rows = selected;
        }
        if let Some(expanded) = patch.expanded_rows {
            changes.expansion = state.expanded_rows != expanded;
            state.expanded_rows = expanded;
        }
        if let Some(page) = patch.page {
            changes.page = state.page != page;
            state.page = page;
        }

        if changes.any() {
            self.revision += 1;
            for (_, listener) in &mut self.listeners {
                listener(&self.state, changes);
            }
        }
        Ok(changes)
    }

    fn validate(&self, patch: &TableStatePatch) -> Result<(), Rejection> {
        if let Some(Some(sort)) = &patch.sort {
            if !self.schema.contains(&sort.key) {
                return Err(Rejection::UnknownSortColumn(sort.key.clone()));
            }
            if !self.schema.sortable.contains(&sort.key) {
                return Err(Rejection::NotSortable(sort.key.clone()));
            }
        }
        if let Some(order) = &patch.column_order {
            if !self.schema.is_permutation(order) {
                return Err(Rejection::InvalidColumnOrder);
            }
        }
        if let Some(visible) = &patch.visible_columns {
            if let Some(unknown) = visible.iter().find(|k| !self.schema.contains(k)) {
                return Err(Rejection::UnknownColumn(unknown.clone()));
            }
            if visible.is_empty() {
                return Err(Rejection::LastVisibleColumn);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStore")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "table_state_tests.rs"]
mod tests;
