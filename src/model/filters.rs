//! Filter values.
//!
//! Filters are a plain name → value mapping. Two names are well known:
//! [`SEARCH`] (free-text search box) and [`STATUS`] (status dropdown). Every
//! other name is an advanced filter matched against the column of the same key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filter name used by the search box.
pub const SEARCH: &str = "search";

/// Filter name used by the status dropdown.
pub const STATUS: &str = "status";

/// Active filter values. Empty values are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    /// No filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear one filter. Blank values remove the entry.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.0.remove(&name);
        } else {
            self.0.insert(name, value);
        }
    }

    /// Builder-style [`Filters::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Value of a filter, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Search box value, if set.
    pub fn search(&self) -> Option<&str> {
        self.get(SEARCH)
    }

    /// Status dropdown value, if set.
    pub fn status(&self) -> Option<&str> {
        self.get(STATUS)
    }

    /// Advanced filters: everything except search and status.
    pub fn advanced(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(name, _)| name.as_str() != SEARCH && name.as_str() != STATUS)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// All filters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of active filters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is filtered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
