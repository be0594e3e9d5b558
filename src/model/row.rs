//! Row abstraction.
//!
//! The engine treats rows as opaque records: it needs a stable id and a way to
//! read a field by column key. Everything else belongs to the caller.

use super::identifiers::{ColumnKey, InvalidRowId, RowId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A single cell value as seen through a column accessor.
pub type CellValue = Value;

/// A row the table engine can display.
///
/// Implementors expose a stable unique id and a keyed accessor. Missing fields
/// should come back as `Value::Null` rather than failing.
pub trait TableRow {
    /// Stable unique identifier.
    fn id(&self) -> &RowId;

    /// Value of the field named by `key`.
    fn value(&self, key: &ColumnKey) -> CellValue;
}

/// A JSON-object backed row.
///
/// The `id` field is required and must be a non-empty string or a number.
/// All fields, including `id`, stay readable through [`TableRow::value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    id: RowId,
    fields: Map<String, Value>,
}

/// Reasons a JSON object cannot become a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRecord {
    /// The object had no `id` field.
    #[error("record is missing an `id` field")]
    MissingId,

    /// The `id` field was not a string or number.
    #[error("record `id` must be a string or number, got {0}")]
    IdType(String),

    /// The `id` field was empty.
    #[error(transparent)]
    Id(#[from] InvalidRowId),
}

impl Record {
    /// Build a record from an id and field map. The id is also stored as the `id` field.
    pub fn new(id: RowId, mut fields: Map<String, Value>) -> Self {
        fields.insert("id".to_string(), Value::String(id.as_str().to_string()));
        Self { id, fields }
    }

    /// Read a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Overwrite a field. Writes to `id` are ignored; ids are stable.
    pub fn set(&mut self, name: &str, value: Value) {
        if name == "id" {
            return;
        }
        self.fields.insert(name.to_string(), value);
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TableRow for Record {
    fn id(&self) -> &RowId {
        &self.id
    }

    fn value(&self, key: &ColumnKey) -> CellValue {
        self.fields.get(key.as_str()).cloned().unwrap_or(Value::Null)
    }
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = InvalidRecord;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match fields.get("id") {
            None | Some(Value::Null) => return Err(InvalidRecord::MissingId),
            Some(Value::String(s)) => RowId::new(s.clone())?,
            Some(Value::Number(n)) => RowId::new(n.to_string())?,
            Some(other) => return Err(InvalidRecord::IdType(type_name(other).to_string())),
        };
        Ok(Self { id, fields })
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Plain-text rendering of a cell value.
///
/// Strings are shown without quotes and nulls as the empty string.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Total order used for local sorting.
///
/// Numbers compare numerically, strings case-insensitively (ties broken by the
/// raw string), and values of different kinds by kind. Nulls sort after
/// everything else in ascending order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ if kind_rank(a) != kind_rank(b) => kind_rank(a).cmp(&kind_rank(b)),
        _ => display_value(a).cmp(&display_value(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

/// Case-insensitive substring match of a value's display text.
///
/// `needle_lower` must already be lowercased.
pub fn value_contains(value: &Value, needle_lower: &str) -> bool {
    display_value(value).to_lowercase().contains(needle_lower)
}
