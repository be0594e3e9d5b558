//! Dataset files: a column schema plus rows, as JSON.
//!
//! ```json
//! {
//!   "columns": [{ "key": "name", "header": "Name", "sortable": true }],
//!   "rows": [{ "id": "e1", "name": "Ada" }],
//!   "status_options": ["active", "on leave"]
//! }
//! ```

use crate::model::error::InputError;
use crate::model::{Align, Column, ColumnKey, ColumnSpec, Record, RowId, SchemaError};
use crate::state::session::validate_schema;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::info;

/// A parsed dataset file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    /// Column schema.
    pub columns: Vec<ColumnSpec>,
    /// Rows.
    #[serde(default)]
    pub rows: Vec<Record>,
    /// Fixed status filter choices.
    #[serde(default)]
    pub status_options: Option<Vec<String>>,
}

impl Dataset {
    /// Read and parse a dataset file.
    ///
    /// # Errors
    ///
    /// `FileNotFound` for a missing path, `InvalidDataset` for malformed JSON
    /// or rows without ids, `Io` for other read failures.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&contents).map_err(|source| InputError::InvalidDataset {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), rows = dataset.rows.len(), "dataset loaded");
        Ok(dataset)
    }

    /// Columns built from the schema, validated.
    pub fn columns(&self) -> Result<Vec<Column>, SchemaError> {
        let columns: Vec<Column> = self.columns.iter().cloned().map(Column::from).collect();
        validate_schema(&columns)?;
        Ok(columns)
    }

    /// A generated staff roster with `count` rows.
    ///
    /// Deterministic, so runs are reproducible.
    pub fn sample(count: usize) -> Self {
        const FIRST: [&str; 8] = ["Ada", "Grace", "Alan", "Edsger", "Barbara", "Ken", "Frances", "Donald"];
        const LAST: [&str; 6] = ["Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Thompson"];
        const TEAMS: [&str; 4] = ["Platform", "Payments", "Search", "Support"];
        const STATUSES: [&str; 3] = ["active", "on leave", "inactive"];

        let spec = |key: &str, header: &str, sortable: bool, editable: bool, align: Align| {
            ColumnKey::new(key).ok().map(|key| ColumnSpec {
                key,
                header: Some(header.to_string()),
                sortable,
                editable,
                align,
                width: None,
                wrap_header: false,
            })
        };
        let columns = [
            spec("name", "Name", true, true, Align::Left),
            spec("email", "Email", false, true, Align::Left),
            spec("team", "Team", true, true, Align::Left),
            spec("status", "Status", true, true, Align::Center),
            spec("tenure", "Tenure (years)", true, true, Align::Right),
            spec("id", "ID", true, false, Align::Right),
        ]
        .into_iter()
        .flatten()
        .collect();

        let rows = (0..count)
            .filter_map(|n| {
                let first = FIRST[n % FIRST.len()];
                let last = LAST[(n / FIRST.len()) % LAST.len()];
                let mut fields = Map::new();
                fields.insert("name".into(), json!(format!("{first} {last}")));
                fields.insert(
                    "email".into(),
                    json!(format!("{}.{}{}@example.com", first.to_lowercase(), last.to_lowercase(), n)),
                );
                fields.insert("team".into(), json!(TEAMS[(n * 7) % TEAMS.len()]));
                fields.insert("status".into(), json!(STATUSES[(n * 5) % STATUSES.len()]));
                fields.insert("tenure".into(), Value::from((n * 3) % 17));
                let id = RowId::new((n + 1).to_string()).ok()?;
                Some(Record::new(id, fields))
            })
            .collect();

        Self {
            columns,
            rows,
            status_options: Some(STATUSES.iter().map(|s| s.to_string()).collect()),
        }
    }
}
