//! Data sources behind a table.
//!
//! - [`dataset`]: JSON dataset files and the built-in sample roster
//! - [`simulated`]: an in-process server answering fetches and saves

use crate::model::{DataError, Record, SaveError};
use crate::state::{DataQuery, FetchResponse, SaveRequest};

pub mod dataset;
pub mod simulated;

pub use dataset::Dataset;
pub use simulated::SimulatedServer;

/// The collaborator a session talks to for rows and saves.
///
/// Calls are synchronous here; the shell decides when to make them and when
/// to hand the result back to the session.
pub trait DataSource {
    /// Every row the source holds, unfiltered.
    fn rows(&self) -> &[Record];

    /// Rows for one query.
    ///
    /// # Errors
    ///
    /// `DataError` when the source cannot answer.
    fn fetch(&mut self, query: &DataQuery) -> Result<FetchResponse<Record>, DataError>;

    /// Persist one cell.
    ///
    /// # Errors
    ///
    /// `SaveError` when the write is rejected.
    fn save(&mut self, request: &SaveRequest) -> Result<(), SaveError>;
}
