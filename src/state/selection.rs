//! Row selection, expansion and bulk actions.
//!
//! Selected and expanded ids live in the table state and are independent of the
//! page and the virtual window. The helpers here compute the next id set; the
//! session writes it through the store.

use crate::model::{Rejection, RowId, TableRow};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Flip membership of `id`.
pub fn toggle(ids: &HashSet<RowId>, id: &RowId) -> HashSet<RowId> {
    let mut next = ids.clone();
    if !next.remove(id) {
        next.insert(id.clone());
    }
    next
}

/// How much of a page is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    /// No row on the page is selected (or the page is empty).
    None,
    /// Some rows are selected.
    Partial,
    /// Every row is selected.
    All,
}

impl PageSelection {
    /// Header checkbox glyph.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::None => "[ ]",
            Self::Partial => "[-]",
            Self::All => "[x]",
        }
    }
}

/// Selection state of the rows in `page`.
pub fn page_selection(selected: &HashSet<RowId>, page: &[RowId]) -> PageSelection {
    let count = page.iter().filter(|id| selected.contains(*id)).count();
    match count {
        0 => PageSelection::None,
        n if n == page.len() => PageSelection::All,
        _ => PageSelection::Partial,
    }
}

/// Header checkbox: deselect the page when fully selected, otherwise select all of it.
///
/// Rows on other pages are left alone.
pub fn toggle_page(selected: &HashSet<RowId>, page: &[RowId]) -> HashSet<RowId> {
    let mut next = selected.clone();
    match page_selection(selected, page) {
        PageSelection::All => {
            for id in page {
                next.remove(id);
            }
        }
        PageSelection::None | PageSelection::Partial => next.extend(page.iter().cloned()),
    }
    next
}

/// Copies of selected rows, so rows selected on a page that is no longer
/// loaded can still be handed to bulk actions and exports.
#[derive(Debug, Clone)]
pub struct SelectionSnapshots<R> {
    rows: HashMap<RowId, R>,
}

impl<R> Default for SelectionSnapshots<R> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<R: TableRow + Clone> SelectionSnapshots<R> {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh snapshots of selected rows found in `loaded` and drop snapshots
    /// of rows no longer selected.
    pub fn sync(&mut self, selected: &HashSet<RowId>, loaded: &[R]) {
        self.rows.retain(|id, _| selected.contains(id));
        for row in loaded {
            if selected.contains(row.id()) {
                self.rows.insert(row.id().clone(), row.clone());
            }
        }
    }

    /// Number of cached rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Materialize the selection.
    ///
    /// Rows present in `loaded` come first in collection order, followed by
    /// snapshot-only rows ordered by id. Selected ids never seen are skipped.
    pub fn materialize(&self, selected: &HashSet<RowId>, loaded: &[R]) -> Vec<R> {
        let mut found: HashSet<&RowId> = HashSet::new();
        let mut rows: Vec<R> = loaded
            .iter()
            .filter(|row| selected.contains(row.id()))
            .inspect(|row| {
                found.insert(row.id());
            })
            .cloned()
            .collect();

        let mut extra: Vec<&R> = self
            .rows
            .iter()
            .filter(|(id, _)| selected.contains(*id) && !found.contains(id))
            .map(|(_, row)| row)
            .collect();
        extra.sort_by(|a, b| a.id().cmp(b.id()));
        rows.extend(extra.into_iter().cloned());
        rows
    }
}

/// A bulk operation over materialized rows.
pub type BulkHandler<R> = Box<dyn FnMut(&[R])>;

/// Named bulk actions, in registration order.
pub struct BulkActions<R> {
    handlers: IndexMap<String, BulkHandler<R>>,
}

impl<R> Default for BulkActions<R> {
    fn default() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }
}

impl<R> BulkActions<R> {
    /// No actions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an action.
    pub fn register(&mut self, name: impl Into<String>, handler: BulkHandler<R>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Action names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run `name` over `rows`.
    pub fn run(&mut self, name: &str, rows: &[R]) -> Result<(), Rejection> {
        let handler = self
            .handlers
            .get_mut(name)
            .ok_or_else(|| Rejection::UnknownBulkAction(name.to_string()))?;
        handler(rows);
        Ok(())
    }
}

impl<R> fmt::Debug for BulkActions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn id(raw: &str) -> RowId {
        RowId::new(raw).expect("valid id")
    }

    fn ids(raw: &[&str]) -> Vec<RowId> {
        raw.iter().map(|r| id(r)).collect()
    }

    fn set(raw: &[&str]) -> HashSet<RowId> {
        ids(raw).into_iter().collect()
    }

    fn record(raw: &str) -> Record {
        serde_json::from_value(json!({"id": raw, "name": raw.to_uppercase()})).expect("record")
    }

    #[test]
    fn toggle_adds_then_removes() {
        let once = toggle(&HashSet::new(), &id("a"));
        assert!(once.contains(&id("a")));
        assert!(toggle(&once, &id("a")).is_empty());
    }

    #[test]
    fn page_selection_states() {
        let page = ids(&["a", "b"]);
        assert_eq!(page_selection(&set(&[]), &page), PageSelection::None);
        assert_eq!(page_selection(&set(&["a", "z"]), &page), PageSelection::Partial);
        assert_eq!(page_selection(&set(&["a", "b"]), &page), PageSelection::All);
        assert_eq!(page_selection(&set(&["a"]), &[]), PageSelection::None);
    }

    #[test]
    fn toggle_page_selects_rest_of_partial_page() {
        let next = toggle_page(&set(&["a", "z"]), &ids(&["a", "b"]));
        assert_eq!(next, set(&["a", "b", "z"]));
    }

    #[test]
    fn toggle_page_clears_only_that_page() {
        let next = toggle_page(&set(&["a", "b", "z"]), &ids(&["a", "b"]));
        assert_eq!(next, set(&["z"]));
    }

    #[test]
    fn snapshots_keep_rows_from_unloaded_pages() {
        let mut snapshots = SelectionSnapshots::new();
        let page_one = vec![record("a"), record("b")];
        let page_two = vec![record("c"), record("d")];
        let selected = set(&["a", "d"]);

        snapshots.sync(&selected, &page_one);
        let rows = snapshots.materialize(&selected, &page_two);

        let got: Vec<&str> = rows.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(got, vec!["d", "a"]);
    }

    #[test]
    fn sync_forgets_deselected_rows() {
        let mut snapshots = SelectionSnapshots::new();
        let rows = vec![record("a"), record("b")];
        snapshots.sync(&set(&["a", "b"]), &rows);
        assert_eq!(snapshots.len(), 2);

        snapshots.sync(&set(&["b"]), &[]);

        assert_eq!(snapshots.len(), 1);
    }

    #[test]
    fn materialize_skips_unknown_ids() {
        let snapshots: SelectionSnapshots<Record> = SelectionSnapshots::new();
        let rows = snapshots.materialize(&set(&["ghost"]), &[record("a")]);
        assert!(rows.is_empty());
    }

    #[test]
    fn bulk_action_receives_rows() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut actions: BulkActions<Record> = BulkActions::new();
        actions.register(
            "archive",
            Box::new(move |rows: &[Record]| {
                sink.borrow_mut()
                    .extend(rows.iter().map(|r| r.id().to_string()));
            }),
        );

        actions
            .run("archive", &[record("a"), record("b")])
            .expect("registered");

        assert_eq!(*seen.borrow(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(actions.names().collect::<Vec<_>>(), vec!["archive"]);
    }

    #[test]
    fn unknown_bulk_action_is_rejected() {
        let mut actions: BulkActions<Record> = BulkActions::new();
        assert_eq!(
            actions.run("delete", &[]),
            Err(Rejection::UnknownBulkAction("delete".to_string()))
        );
    }
}
