//! In-process stand-in for a remote data service.
//!
//! Answers fetches by filtering, sorting and paging its own copy of the rows,
//! and applies saves to that copy. Failures can be injected to exercise the
//! error panel and the failed-save path.

use super::DataSource;
use crate::model::{Column, DataError, Pagination, Record, SaveError, TableRow};
use crate::state::{DataQuery, FetchResponse, SaveRequest};
use crate::view_state::derive_rows;
use tracing::{debug, warn};

/// A fake server over an in-memory collection.
#[derive(Debug, Clone)]
pub struct SimulatedServer {
    columns: Vec<Column>,
    rows: Vec<Record>,
    fail_saves: bool,
    failing_fetches: usize,
}

impl SimulatedServer {
    /// Server holding `rows` described by `columns`.
    pub fn new(columns: Vec<Column>, rows: Vec<Record>) -> Self {
        Self {
            columns,
            rows,
            fail_saves: false,
            failing_fetches: 0,
        }
    }

    /// Reject every save.
    pub fn fail_saves(mut self, fail: bool) -> Self {
        self.fail_saves = fail;
        self
    }

    /// Fail the next `count` fetches.
    pub fn fail_next_fetches(mut self, count: usize) -> Self {
        self.failing_fetches = count;
        self
    }
}

impl DataSource for SimulatedServer {
    fn rows(&self) -> &[Record] {
        &self.rows
    }

    fn fetch(&mut self, query: &DataQuery) -> Result<FetchResponse<Record>, DataError> {
        if self.failing_fetches > 0 {
            self.failing_fetches -= 1;
            warn!("simulated fetch failure");
            return Err(DataError::new("service unavailable (simulated)"));
        }
        let derived = derive_rows(
            &self.rows,
            &self.columns,
            &query.filters,
            query.sort.as_ref(),
            Some(query.page),
        );
        let pagination = derived
            .pagination
            .unwrap_or_else(|| Pagination::for_request(query.page, derived.total));
        debug!(page = pagination.page(), total = pagination.total(), "simulated fetch");
        Ok(FetchResponse {
            rows: derived.rows.into_iter().cloned().collect(),
            pagination,
        })
    }

    fn save(&mut self, request: &SaveRequest) -> Result<(), SaveError> {
        if self.fail_saves {
            return Err(SaveError::new("record is locked (simulated)"));
        }
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id() == &request.row_id)
            .ok_or_else(|| SaveError::new(format!("row `{}` no longer exists", request.row_id)))?;
        row.set(request.column_key.as_str(), request.value.clone());
        Ok(())
    }
}
