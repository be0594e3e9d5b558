//! Core view-state newtypes

/// Fixed height of every row, in layout units (terminal lines, pixels, ...).
///
/// Always >= 1. Virtualization relies on a fixed row height; tables with
/// variable-height rows must paginate instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowHeight(usize);

/// Error returned when attempting to create a zero RowHeight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("RowHeight must be >= 1 (got {0})")]
pub struct InvalidRowHeight(pub usize);

impl RowHeight {
    /// One unit per row, as in a terminal grid.
    pub const ONE: Self = Self(1);

    /// Smart constructor that validates height is >= 1.
    pub fn new(height: usize) -> Result<Self, InvalidRowHeight> {
        if height == 0 {
            Err(InvalidRowHeight(height))
        } else {
            Ok(Self(height))
        }
    }

    /// Get the raw value.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for RowHeight {
    fn default() -> Self {
        Self::ONE
    }
}
