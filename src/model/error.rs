//! Error types for rostergrid.
//!
//! The taxonomy follows how each failure is handled:
//!
//! - [`Rejection`] - caller contract violations (bad sort key, editing a synthetic
//!   column, ...). Operations return it as `Err`, state is left untouched, and the
//!   UI treats it as a silent no-op. These indicate integration bugs, not runtime
//!   conditions, so they are only logged at `debug`.
//! - [`DataError`] / [`SaveError`] - the external collaborator failed. Load failures
//!   switch the table into its error panel with a retry affordance; save failures
//!   keep the edit open with its buffer intact.
//! - [`ExportError`] - encoding an export document failed.
//! - [`SchemaError`] - the column schema handed to a session is unusable.
//! - [`InputError`] / [`AppError`] - dataset loading and top-level aggregation for
//!   the binary.
//!
//! Malformed pagination numbers are not errors at all: they are coerced in place
//! (see [`crate::model::pagination`]).

use super::identifiers::{ColumnKey, RowId};
use std::path::PathBuf;
use thiserror::Error;

/// A caller contract violation. State is never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Sort key is not part of the schema.
    #[error("unknown sort column `{0}`")]
    UnknownSortColumn(ColumnKey),

    /// Sort key names a column that is not sortable.
    #[error("column `{0}` is not sortable")]
    NotSortable(ColumnKey),

    /// Column order is not a permutation of the schema keys.
    #[error("column order must be a permutation of the schema keys")]
    InvalidColumnOrder,

    /// Column key is not part of the schema.
    #[error("unknown column `{0}`")]
    UnknownColumn(ColumnKey),

    /// At least one data column must stay visible.
    #[error("cannot hide the last visible column")]
    LastVisibleColumn,

    /// Row id is not in the current row collection.
    #[error("unknown row `{0}`")]
    UnknownRow(RowId),

    /// Inline editing is disabled for this table.
    #[error("inline editing is disabled")]
    EditingDisabled,

    /// Column is not editable (read-only or synthetic).
    #[error("column `{0}` is not editable")]
    NotEditable(String),

    /// No cell is in edit mode.
    #[error("no cell is being edited")]
    NotEditing,

    /// A save for this edit is already in flight.
    #[error("a save is already in flight")]
    SaveInFlight,

    /// The requested feature flag is off.
    #[error("feature `{0}` is disabled")]
    FeatureDisabled(&'static str),

    /// No bulk action is registered under this name.
    #[error("unknown bulk action `{0}`")]
    UnknownBulkAction(String),

    /// No column drag is in progress.
    #[error("no column drag in progress")]
    NoDrag,

    /// A column drag is in progress; header clicks are ignored until it ends.
    #[error("column drag in progress")]
    DragInProgress,

    /// No effective column at this display position.
    #[error("no column at position {0}")]
    ColumnOutOfRange(usize),
}

/// The external data source failed to deliver rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("data source failed: {message}")]
pub struct DataError {
    /// Human-readable reason, shown in the error panel.
    pub message: String,
}

impl DataError {
    /// Create a data error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The external save handler rejected an inline edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("save failed: {message}")]
pub struct SaveError {
    /// Human-readable reason, shown next to the edited cell.
    pub message: String,
}

impl SaveError {
    /// Create a save error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Export encoding failures.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer failed.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// CSV buffer could not be recovered from the writer.
    #[error("CSV export failed: {0}")]
    CsvBuffer(String),

    /// JSON encoding failed.
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// The column schema cannot back a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No columns were supplied.
    #[error("column schema is empty")]
    Empty,

    /// Two columns share a key.
    #[error("duplicate column key `{0}`")]
    DuplicateKey(ColumnKey),
}

/// Failures loading a dataset file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The dataset path does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// The dataset is not valid JSON or does not match the dataset shape.
    #[error("Invalid dataset {path}: {source}")]
    InvalidDataset {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The dataset's column schema is unusable.
    #[error("Invalid dataset schema: {0}")]
    Schema(#[from] SchemaError),

    /// Generic I/O failure while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error for the binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Dataset loading failed.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// Terminal or rendering failure.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}
