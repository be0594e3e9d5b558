//! Column pipeline.
//!
//! Derives the ordered, visible column list from the schema and table state and
//! injects the synthetic leading columns. Synthetic columns are tagged variants,
//! and [`EffectiveColumns`] always yields them in the same order: expansion,
//! then selection, then data columns.

use crate::model::{Column, ColumnKey};
use crate::state::table_state::TableState;
use std::collections::{HashMap, HashSet};

/// Feature flags that add synthetic columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnFlags {
    /// Prepend a selection checkbox column.
    pub selectable: bool,
    /// Prepend an expansion toggle column (leftmost).
    pub expandable: bool,
}

/// One column of the effective sequence.
#[derive(Debug, Clone, Copy)]
pub enum EffectiveColumn<'a> {
    /// Row expansion toggle.
    Expansion,
    /// Row selection checkbox.
    Selection,
    /// Schema column.
    Data(&'a Column),
}

impl<'a> EffectiveColumn<'a> {
    /// True for engine-injected columns.
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, Self::Data(_))
    }

    /// The schema column, if this is one.
    pub fn data(&self) -> Option<&'a Column> {
        match *self {
            Self::Data(column) => Some(column),
            _ => None,
        }
    }

    /// Key of the schema column, if this is one.
    pub fn key(&self) -> Option<&'a ColumnKey> {
        self.data().map(Column::key)
    }
}

/// Effective column list for rendering and export.
#[derive(Debug, Clone, Default)]
pub struct EffectiveColumns<'a> {
    expansion: bool,
    selection: bool,
    data: Vec<&'a Column>,
}

impl<'a> EffectiveColumns<'a> {
    /// Iterate all columns, synthetic ones first.
    pub fn iter(&self) -> impl Iterator<Item = EffectiveColumn<'a>> + '_ {
        let expansion = self.expansion.then_some(EffectiveColumn::Expansion);
        let selection = self.selection.then_some(EffectiveColumn::Selection);
        expansion
            .into_iter()
            .chain(selection)
            .chain(self.data.iter().copied().map(EffectiveColumn::Data))
    }

    /// Total number of columns including synthetic ones.
    pub fn len(&self) -> usize {
        self.synthetic_count() + self.data.len()
    }

    /// True if there are no columns at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of leading synthetic columns.
    pub fn synthetic_count(&self) -> usize {
        usize::from(self.expansion) + usize::from(self.selection)
    }

    /// Visible schema columns in display order.
    pub fn data_columns(&self) -> &[&'a Column] {
        &self.data
    }

    /// Whether the expansion column is present.
    pub fn has_expansion(&self) -> bool {
        self.expansion
    }

    /// Whether the selection column is present.
    pub fn has_selection(&self) -> bool {
        self.selection
    }

    /// Column at a display position.
    pub fn get(&self, index: usize) -> Option<EffectiveColumn<'a>> {
        self.iter().nth(index)
    }

    /// Position of a data column among the data columns.
    pub fn data_position(&self, key: &ColumnKey) -> Option<usize> {
        self.data.iter().position(|c| c.key() == key)
    }
}

/// Derive the effective columns from the schema and committed table state.
pub fn derive_columns<'a>(
    schema: &'a [Column],
    state: &TableState,
    flags: ColumnFlags,
) -> EffectiveColumns<'a> {
    derive_columns_with_order(schema, state.column_order(), state.visible_columns(), flags)
}

/// Derive the effective columns from an explicit order.
///
/// Used for drag previews, where the displayed order is not yet committed.
pub fn derive_columns_with_order<'a>(
    schema: &'a [Column],
    order: &[ColumnKey],
    visible: &HashSet<ColumnKey>,
    flags: ColumnFlags,
) -> EffectiveColumns<'a> {
    let by_key: HashMap<&ColumnKey, &'a Column> = schema.iter().map(|c| (c.key(), c)).collect();
    let data = order
        .iter()
        .filter(|key| visible.contains(*key))
        .filter_map(|key| by_key.get(key).copied())
        .collect();

    EffectiveColumns {
        expansion: flags.expandable,
        selection: flags.selectable,
        data,
    }
}
