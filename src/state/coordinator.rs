//! Sort / filter / pagination coordinator.
//!
//! Translates user intent into store updates and, in collaborator-driven mode,
//! into fetch requests. Every filter change lands on page 1; page changes are
//! clamped rather than rejected.
//!
//! Fetch requests carry a [`FetchTicket`]. Only the newest ticket is live: a
//! response for any older ticket is stale and must be dropped by the caller, so
//! a slow earlier response can never overwrite a newer view.

use super::debounce::Debouncer;
use super::table_state::{ChangeSet, TableState, TableStatePatch, TableStore};
use crate::model::filters::{SEARCH, STATUS};
use crate::model::sort::next_sort;
use crate::model::{ColumnKey, Filters, PageRequest, Pagination, Rejection, SortSpec};
use std::time::{Duration, Instant};
use tracing::debug;

/// Where rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataMode {
    /// The whole collection is in memory and derived locally.
    #[default]
    Local,
    /// An external collaborator sorts, filters and pages.
    Remote,
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    /// Raw sequence number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// What the collaborator is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQuery {
    /// Sort to apply.
    pub sort: Option<SortSpec>,
    /// Filters to apply.
    pub filters: Filters,
    /// Page to return.
    pub page: PageRequest,
}

impl DataQuery {
    /// Query describing the given state.
    pub fn from_state(state: &TableState) -> Self {
        Self {
            sort: state.sort().cloned(),
            filters: state.filters().clone(),
            page: state.page(),
        }
    }
}

/// A query bound to its ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Ticket to hand back with the response.
    pub ticket: FetchTicket,
    /// Requested data.
    pub query: DataQuery,
}

/// Result of one coordinated interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Fields the store actually changed.
    pub changes: ChangeSet,
    /// Request to send to the collaborator, if one is needed.
    pub fetch: Option<FetchRequest>,
}

/// Coordinates sort, search, filter and page transitions.
#[derive(Debug)]
pub struct Coordinator {
    mode: DataMode,
    search: Debouncer<String>,
    next_ticket: u64,
    in_flight: Option<FetchRequest>,
    last_query: Option<DataQuery>,
}

impl Coordinator {
    /// Coordinator for `mode` with the given search quiet period.
    pub fn new(mode: DataMode, search_debounce: Duration) -> Self {
        Self {
            mode,
            search: Debouncer::new(search_debounce),
            next_ticket: 0,
            in_flight: None,
            last_query: None,
        }
    }

    /// Data mode.
    pub fn mode(&self) -> DataMode {
        self.mode
    }

    // ===== sort =====

    /// Header click on `key`: new key sorts ascending, same key flips direction.
    ///
    /// Rejected (and nothing changes) when the column is unknown or not sortable.
    pub fn click_sort(&mut self, store: &mut TableStore, key: &ColumnKey) -> Result<Outcome, Rejection> {
        let next = next_sort(store.state().sort(), key);
        let changes = store.update(TableStatePatch::new().sort(Some(next)))?;
        Ok(self.after_update(store.state(), changes))
    }

    // ===== search =====

    /// Record a keystroke's worth of search text. Nothing commits until the
    /// quiet period passes with no further input.
    pub fn type_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search.schedule(text.into(), now);
    }

    /// Search text waiting on the debounce.
    pub fn pending_search(&self) -> Option<&str> {
        self.search.pending().map(String::as_str)
    }

    /// Time until the pending search commits.
    pub fn search_due_in(&self, now: Instant) -> Option<Duration> {
        self.search.remaining(now)
    }

    /// Commit the pending search if its quiet period has elapsed.
    pub fn tick(&mut self, store: &mut TableStore, now: Instant) -> Result<Option<Outcome>, Rejection> {
        match self.search.poll(now) {
            Some(text) => self.commit_filter(store, SEARCH, text).map(Some),
            None => Ok(None),
        }
    }

    /// Commit the pending search right away (e.g. Enter in the search box).
    pub fn flush_search(&mut self, store: &mut TableStore) -> Result<Option<Outcome>, Rejection> {
        match self.search.flush() {
            Some(text) => self.commit_filter(store, SEARCH, text).map(Some),
            None => Ok(None),
        }
    }

    // ===== filters =====

    /// Set or clear the status filter. Commits immediately.
    pub fn set_status(&mut self, store: &mut TableStore, status: Option<&str>) -> Result<Outcome, Rejection> {
        self.commit_filter(store, STATUS, status.unwrap_or_default())
    }

    /// Set or clear any filter by name. Commits immediately.
    pub fn set_filter(
        &mut self,
        store: &mut TableStore,
        name: &str,
        value: &str,
    ) -> Result<Outcome, Rejection> {
        self.commit_filter(store, name, value)
    }

    /// Clear every filter and go to page 1 in one update.
    ///
    /// A search still waiting on its debounce is discarded too.
    pub fn clear_filters(&mut self, store: &mut TableStore) -> Result<Outcome, Rejection> {
        self.search.cancel();
        let page = store.state().page();
        let changes = store.update(
            TableStatePatch::new()
                .filters(Filters::new())
                .page(PageRequest::first(page.page_size())),
        )?;
        Ok(self.after_update(store.state(), changes))
    }

    /// Writes only `name` on top of the current filters, so a delayed search
    /// commit never reverts a status change made while it was pending.
    fn commit_filter(
        &mut self,
        store: &mut TableStore,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Outcome, Rejection> {
        let state = store.state();
        let mut filters = state.filters().clone();
        filters.set(name, value);
        if &filters == state.filters() {
            return Ok(Outcome::default());
        }
        let first = PageRequest::first(state.page().page_size());
        let changes = store.update(TableStatePatch::new().filters(filters).page(first))?;
        Ok(self.after_update(store.state(), changes))
    }

    // ===== pages =====

    /// Go to `page`, clamped into `[1, total_pages]` of `current`.
    pub fn go_to_page(
        &mut self,
        store: &mut TableStore,
        current: &Pagination,
        page: usize,
    ) -> Result<Outcome, Rejection> {
        let target = current.clamp_page(page);
        let request = store.state().page().with_page(target);
        let changes = store.update(TableStatePatch::new().page(request))?;
        Ok(self.after_update(store.state(), changes))
    }

    /// Change rows per page and return to page 1.
    pub fn set_page_size(&mut self, store: &mut TableStore, page_size: usize) -> Result<Outcome, Rejection> {
        let changes = store.update(TableStatePatch::new().page(PageRequest::first(page_size)))?;
        Ok(self.after_update(store.state(), changes))
    }

    // ===== remote fetches =====

    /// Request for the current state, unless the same query is already in flight.
    pub fn request_fetch(&mut self, state: &TableState) -> Option<FetchRequest> {
        if self.mode != DataMode::Remote {
            return None;
        }
        let query = DataQuery::from_state(state);
        if self.in_flight.as_ref().is_some_and(|r| r.query == query) {
            debug!(?query, "identical fetch already in flight");
            return None;
        }
        Some(self.issue(query))
    }

    /// Re-issue the most recent query regardless of what is in flight.
    pub fn retry(&mut self, state: &TableState) -> Option<FetchRequest> {
        if self.mode != DataMode::Remote {
            return None;
        }
        let query = self
            .last_query
            .clone()
            .unwrap_or_else(|| DataQuery::from_state(state));
        Some(self.issue(query))
    }

    /// Mark `ticket` as answered. Returns false for a stale ticket.
    pub fn resolve(&mut self, ticket: FetchTicket) -> bool {
        match &self.in_flight {
            Some(request) if request.ticket == ticket => {
                self.in_flight = None;
                true
            }
            _ => {
                debug!(ticket = ticket.get(), "dropping stale fetch response");
                false
            }
        }
    }

    /// The live request, if one is outstanding.
    pub fn in_flight(&self) -> Option<&FetchRequest> {
        self.in_flight.as_ref()
    }

    fn issue(&mut self, query: DataQuery) -> FetchRequest {
        self.next_ticket += 1;
        let request = FetchRequest {
            ticket: FetchTicket(self.next_ticket),
            query,
        };
        if let Some(superseded) = self.in_flight.replace(request.clone()) {
            debug!(ticket = superseded.ticket.get(), "fetch superseded");
        }
        self.last_query = Some(request.query.clone());
        request
    }

    fn after_update(&mut self, state: &TableState, changes: ChangeSet) -> Outcome {
        let fetch = if changes.affects_rows() {
            self.request_fetch(state)
        } else {
            None
        };
        Outcome { changes, fetch }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
