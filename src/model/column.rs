//! Column schema.
//!
//! Columns are immutable inputs. The engine derives the visible, ordered column
//! list from them but never mutates the schema itself.

use super::identifiers::ColumnKey;
use super::row::{display_value, CellValue, TableRow};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Horizontal alignment of a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Flush left (default).
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Custom cell formatter: `(value, row) -> displayable text`.
pub type CellRenderer = Arc<dyn Fn(&CellValue, &dyn TableRow) -> String + Send + Sync>;

/// One column of the caller's schema.
#[derive(Clone)]
pub struct Column {
    key: ColumnKey,
    header: String,
    sortable: bool,
    editable: bool,
    align: Align,
    width: Option<u16>,
    wrap_header: bool,
    render: Option<CellRenderer>,
}

impl Column {
    /// Create a non-sortable, editable, left-aligned column.
    pub fn new(key: ColumnKey, header: impl Into<String>) -> Self {
        Self {
            key,
            header: header.into(),
            sortable: false,
            editable: true,
            align: Align::Left,
            width: None,
            wrap_header: false,
            render: None,
        }
    }

    /// Mark the column as sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Mark the column as read-only for inline editing.
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Set cell alignment.
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Set the preferred width in character cells.
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Allow the header label to wrap.
    pub fn wrap_header(mut self) -> Self {
        self.wrap_header = true;
        self
    }

    /// Install a custom cell renderer.
    pub fn render_with<F>(mut self, render: F) -> Self
    where
        F: Fn(&CellValue, &dyn TableRow) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Field identifier.
    pub fn key(&self) -> &ColumnKey {
        &self.key
    }

    /// Display label.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Whether header clicks sort by this column.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Whether cells of this column accept inline edits.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Cell alignment.
    pub fn alignment(&self) -> Align {
        self.align
    }

    /// Width hint, if any.
    pub fn width_hint(&self) -> Option<u16> {
        self.width
    }

    /// Whether the header may wrap.
    pub fn wraps_header(&self) -> bool {
        self.wrap_header
    }

    /// Text shown for this column's cell in `row`.
    pub fn cell_text(&self, row: &dyn TableRow) -> String {
        let value = row.value(&self.key);
        match &self.render {
            Some(render) => render(&value, row),
            None => display_value(&value),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("editable", &self.editable)
            .field("align", &self.align)
            .field("width", &self.width)
            .field("wrap_header", &self.wrap_header)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Serialized form of a column, as found in dataset files.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    /// Field identifier.
    pub key: ColumnKey,
    /// Display label; defaults to the key.
    #[serde(default)]
    pub header: Option<String>,
    /// Sortable flag.
    #[serde(default)]
    pub sortable: bool,
    /// Editable flag (defaults to true).
    #[serde(default = "default_true")]
    pub editable: bool,
    /// Cell alignment.
    #[serde(default)]
    pub align: Align,
    /// Width hint.
    #[serde(default)]
    pub width: Option<u16>,
    /// Header wrapping.
    #[serde(default)]
    pub wrap_header: bool,
}

fn default_true() -> bool {
    true
}

impl From<ColumnSpec> for Column {
    fn from(spec: ColumnSpec) -> Self {
        let header = spec.header.unwrap_or_else(|| spec.key.to_string());
        let mut column = Column::new(spec.key, header).align(spec.align);
        column.sortable = spec.sortable;
        column.editable = spec.editable;
        column.width = spec.width;
        column.wrap_header = spec.wrap_header;
        column
    }
}
