//! Column reorder protocol.
//!
//! A drag over column headers. On every drag-over of a new target the source key
//! is removed and re-inserted at the target's index. In [`ReorderMode::Live`]
//! that new order is committed to the store immediately and kept when the drag
//! ends, drop or no drop. In [`ReorderMode::OnDrop`] it is only a preview until
//! the drop; ending the drag without a drop reverts to the committed order.
//!
//! Repeated drag-over events for the target already applied are ignored, so a
//! pointer resting on a header cannot make two columns swap back and forth.
//! Drag-leave keeps the applied target: after the move the source already sits
//! at that index, so re-entering the same header has nothing left to apply.

use super::table_state::{ChangeSet, TableState, TableStatePatch, TableStore};
use crate::model::{ColumnKey, Rejection};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// When a drag's order is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderMode {
    /// Commit on every drag-over.
    #[default]
    Live,
    /// Preview during the drag, commit on drop.
    OnDrop,
}

/// Move `source` to `target`'s index. `None` if either key is missing or they are equal.
///
/// The index is taken from the order before removal and clamped to the end, so
/// dragging right lands the source after the target and dragging left lands it
/// before.
pub fn move_key(order: &[ColumnKey], source: &ColumnKey, target: &ColumnKey) -> Option<Vec<ColumnKey>> {
    if source == target {
        return None;
    }
    let from = order.iter().position(|k| k == source)?;
    let to = order.iter().position(|k| k == target)?;
    let mut next = order.to_vec();
    let moved = next.remove(from);
    next.insert(to.min(next.len()), moved);
    Some(next)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnDrag {
    source: ColumnKey,
    applied_target: Option<ColumnKey>,
    hover: Option<ColumnKey>,
    preview: Option<Vec<ColumnKey>>,
}

/// Drag state for one table.
#[derive(Debug, Clone, Default)]
pub struct ReorderProtocol {
    mode: ReorderMode,
    drag: Option<ColumnDrag>,
}

impl ReorderProtocol {
    /// Protocol in the given mode.
    pub fn new(mode: ReorderMode) -> Self {
        Self { mode, drag: None }
    }

    /// Commit mode.
    pub fn mode(&self) -> ReorderMode {
        self.mode
    }

    /// Column being dragged.
    pub fn dragging(&self) -> Option<&ColumnKey> {
        self.drag.as_ref().map(|d| &d.source)
    }

    /// Header currently highlighted as the drop target.
    pub fn hovered(&self) -> Option<&ColumnKey> {
        self.drag.as_ref().and_then(|d| d.hover.as_ref())
    }

    /// Order to display: the preview while one exists, else the committed order.
    pub fn display_order<'a>(&'a self, state: &'a TableState) -> &'a [ColumnKey] {
        self.drag
            .as_ref()
            .and_then(|d| d.preview.as_deref())
            .unwrap_or(state.column_order())
    }

    /// Begin dragging `source`. Replaces any drag already in progress.
    pub fn drag_start(&mut self, state: &TableState, source: &ColumnKey) -> Result<(), Rejection> {
        if !state.column_order().contains(source) {
            return Err(Rejection::UnknownColumn(source.clone()));
        }
        self.drag = Some(ColumnDrag {
            source: source.clone(),
            applied_target: None,
            hover: None,
            preview: None,
        });
        Ok(())
    }

    /// Drag passes over `target`.
    ///
    /// Live mode returns the committed change; on-drop mode only updates the
    /// preview and returns an empty change set.
    pub fn drag_over(&mut self, store: &mut TableStore, target: &ColumnKey) -> Result<ChangeSet, Rejection> {
        let mode = self.mode;
        let drag = self.drag.as_mut().ok_or(Rejection::NoDrag)?;
        drag.hover = Some(target.clone());
        if drag.applied_target.as_ref() == Some(target) {
            return Ok(ChangeSet::default());
        }

        let base = drag
            .preview
            .as_deref()
            .unwrap_or(store.state().column_order());
        let Some(next) = move_key(base, &drag.source, target) else {
            return Ok(ChangeSet::default());
        };
        drag.applied_target = Some(target.clone());

        match mode {
            ReorderMode::Live => {
                debug!(source = %drag.source, %target, "live column reorder");
                store.update(TableStatePatch::new().column_order(next))
            }
            ReorderMode::OnDrop => {
                drag.preview = Some(next);
                Ok(ChangeSet::default())
            }
        }
    }

    /// Pointer left the hovered header. Clears the highlight only.
    pub fn drag_leave(&mut self) {
        if let Some(drag) = self.drag.as_mut() {
            drag.hover = None;
        }
    }

    /// Drop: commits the preview in on-drop mode, then ends the drag.
    pub fn drop_column(&mut self, store: &mut TableStore) -> Result<ChangeSet, Rejection> {
        let drag = self.drag.take().ok_or(Rejection::NoDrag)?;
        match drag.preview {
            Some(order) => store.update(TableStatePatch::new().column_order(order)),
            None => Ok(ChangeSet::default()),
        }
    }

    /// Drag ended without a drop. Live reorders stay; previews are discarded.
    pub fn drag_end(&mut self) {
        if let Some(drag) = self.drag.take() {
            if drag.preview.is_some() {
                debug!(source = %drag.source, "drag ended without drop; preview discarded");
            }
        }
    }
}

/// Move `key` one visible slot left (`-1`) or right (`+1`).
///
/// Uses the same remove-and-insert step as a drag onto the neighbouring visible
/// column. At either edge nothing changes.
pub fn move_column(store: &mut TableStore, key: &ColumnKey, delta: isize) -> Result<ChangeSet, Rejection> {
    let state = store.state();
    let visible: Vec<&ColumnKey> = state
        .column_order()
        .iter()
        .filter(|k| state.is_visible(k))
        .collect();
    let at = visible
        .iter()
        .position(|k| *k == key)
        .ok_or_else(|| Rejection::UnknownColumn(key.clone()))?;
    let Some(neighbour) = at
        .checked_add_signed(delta)
        .and_then(|i| visible.get(i))
    else {
        return Ok(ChangeSet::default());
    };
    let Some(next) = move_key(state.column_order(), key, neighbour) else {
        return Ok(ChangeSet::default());
    };
    store.update(TableStatePatch::new().column_order(next))
}

// ===== Tests =====

#[cfg(test)]
#[path = "reorder_tests.rs"]
mod tests;
