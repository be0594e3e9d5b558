//! Row windowing for virtualized rendering.
//!
//! Only rows inside the window are materialized; everything above and below is
//! represented by spacer height so the scrollable extent stays correct. This runs
//! on every scroll event and is O(1): no sorting or filtering happens here.

use super::types::RowHeight;
use std::ops::Range;

/// Slice of rows to render plus the spacers around it.
///
/// # Invariants
/// - `start_index <= end_index <= row_count`
/// - `top_spacer_height + len() * row_height + bottom_spacer_height == total_height`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VirtualWindow {
    /// Index of the first materialized row (inclusive).
    pub start_index: usize,
    /// Index one past the last materialized row (exclusive).
    pub end_index: usize,
    /// `row_count * row_height`.
    pub total_height: usize,
    /// Height standing in for rows before `start_index`.
    pub top_spacer_height: usize,
    /// Height standing in for rows from `end_index` on.
    pub bottom_spacer_height: usize,
}

impl VirtualWindow {
    /// Number of materialized rows.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// True when nothing is materialized.
    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Materialized index range.
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    /// Iterate over materialized row indices.
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        self.range()
    }

    /// Check if a row index is materialized.
    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// Compute the window for a scroll position.
///
/// `start = floor(scroll_offset / row_height) - overscan` (saturating at 0),
/// `end = start + ceil(viewport_height / row_height) + 2 * overscan`, both capped
/// at `row_count`. Scroll offsets past the end are the scroll container's job to
/// clamp; here they simply yield an empty window at the bottom.
pub fn compute_window(
    row_count: usize,
    row_height: RowHeight,
    scroll_offset: usize,
    viewport_height: usize,
    overscan: usize,
) -> VirtualWindow {
    let h = row_height.get();
    let first_visible = scroll_offset / h;
    let start_index = first_visible.saturating_sub(overscan).min(row_count);
    let visible_count = viewport_height
        .div_ceil(h)
        .saturating_add(overscan.saturating_mul(2));
    let end_index = start_index.saturating_add(visible_count).min(row_count);

    VirtualWindow {
        start_index,
        end_index,
        total_height: row_count.saturating_mul(h),
        top_spacer_height: start_index * h,
        bottom_spacer_height: (row_count - end_index) * h,
    }
}

/// Largest meaningful scroll offset: the last viewport's worth of rows.
pub fn max_scroll_offset(row_count: usize, row_height: RowHeight, viewport_height: usize) -> usize {
    row_count
        .saturating_mul(row_height.get())
        .saturating_sub(viewport_height)
}

/// Scroll offset that keeps row `index` fully inside the viewport.
///
/// Returns `current_offset` unchanged when the row is already visible.
pub fn reveal_row(
    index: usize,
    current_offset: usize,
    row_height: RowHeight,
    viewport_height: usize,
) -> usize {
    let h = row_height.get();
    let row_top = index * h;
    let row_bottom = row_top + h;
    if row_top < current_offset {
        row_top
    } else if row_bottom > current_offset + viewport_height {
        row_bottom.saturating_sub(viewport_height)
    } else {
        current_offset
    }
}
