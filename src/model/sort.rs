//! Sort specification.

use super::identifiers::ColumnKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// The other direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Header indicator glyph.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

/// Active sort: one column and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column being sorted.
    pub key: ColumnKey,
    /// Direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending sort on `key`.
    pub fn asc(key: ColumnKey) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `key`.
    pub fn desc(key: ColumnKey) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }
}

/// Sort after a header click on `key`.
///
/// A new column starts ascending; clicking the active column flips direction.
/// There is no unsorted third state.
pub fn next_sort(current: Option<&SortSpec>, key: &ColumnKey) -> SortSpec {
    match current {
        Some(active) if &active.key == key => SortSpec {
            key: key.clone(),
            direction: active.direction.toggled(),
        },
        _ => SortSpec::asc(key.clone()),
    }
}
