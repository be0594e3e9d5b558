//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod column;
pub mod error;
pub mod filters;
pub mod identifiers;
pub mod key_action;
pub mod pagination;
pub mod row;
pub mod sort;

// Re-export for convenience
pub use column::{Align, CellRenderer, Column, ColumnSpec};
pub use error::{
    AppError, DataError, ExportError, InputError, Rejection, SaveError, SchemaError,
};
pub use filters::Filters;
pub use identifiers::{ColumnKey, InvalidColumnKey, InvalidRowId, RowId};
pub use key_action::TableAction;
pub use pagination::{PageRequest, Pagination};
pub use row::{CellValue, InvalidRecord, Record, TableRow};
pub use sort::{SortDirection, SortSpec};
