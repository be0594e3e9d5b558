//! View-state layer - windowing, derived columns and rows, toolbar, export
//!
//! Everything here is derived from the table state and the row collection; nothing
//! in this layer is authoritative or persisted.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (RowHeight)
//! - `window`: VirtualWindow - row windowing with overscan and spacers
//! - `columns`: EffectiveColumns - ordered visible columns with synthetic leaders
//! - `rows`: local filter / sort / paginate derivation
//! - `toolbar`: ToolbarModel - snapshot of the control surface
//! - `export`: ExportDocument - CSV / JSON export

pub mod columns;
pub mod export;
pub mod rows;
pub mod toolbar;
pub mod types;
pub mod window;

pub use columns::{derive_columns, ColumnFlags, EffectiveColumn, EffectiveColumns};
pub use export::{ExportDocument, ExportFormat, ExportScope};
pub use rows::{derive_rows, DerivedRows};
pub use toolbar::{ColumnMenuItem, ToolbarFlags, ToolbarModel};
pub use types::{InvalidRowHeight, RowHeight};
pub use window::{compute_window, VirtualWindow};
