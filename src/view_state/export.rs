//! Export documents.
//!
//! An export maps each row to `{header: value}` pairs over the effective data
//! columns. Synthetic columns never reach the output. Cells are stored by
//! position, so two columns sharing a header both survive; JSON output tells
//! them apart by suffixing the column key to the repeated header.

use super::columns::EffectiveColumns;
use crate::model::row::display_value;
use crate::model::{CellValue, ExportError, TableRow};
use indexmap::IndexMap;
use std::fmt;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Comma-separated values with a header line.
    Csv,
    /// Pretty-printed JSON array of objects.
    Json,
}

impl ExportFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which rows an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportScope {
    /// Every row matching the current filters, in display order, unpaginated.
    #[default]
    All,
    /// Selected rows only.
    Selected,
}

/// Rows reduced to the effective data columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    /// Requested encoding.
    pub format: ExportFormat,
    /// Column headers in display order.
    pub headers: Vec<String>,
    /// Unique object keys for JSON output, parallel to `headers`.
    pub fields: Vec<String>,
    /// One row of cells per record, parallel to `headers`.
    pub records: Vec<Vec<CellValue>>,
}

impl ExportDocument {
    /// Reduce `rows` to the data columns of `columns`.
    pub fn build<R: TableRow>(format: ExportFormat, columns: &EffectiveColumns<'_>, rows: &[&R]) -> Self {
        let data = columns.data_columns();
        let headers: Vec<String> = data.iter().map(|c| c.header().to_string()).collect();
        let mut fields: Vec<String> = Vec::with_capacity(data.len());
        for column in data {
            let header = column.header();
            if fields.iter().any(|f| f == header) {
                fields.push(format!("{header} ({})", column.key()));
            } else {
                fields.push(header.to_string());
            }
        }
        let records = rows
            .iter()
            .map(|row| data.iter().map(|c| row.value(c.key())).collect())
            .collect();
        Self {
            format,
            headers,
            fields,
            records,
        }
    }

    /// Cell of record `row` under the first column titled `header`.
    pub fn cell(&self, row: usize, header: &str) -> Option<&CellValue> {
        let index = self.headers.iter().position(|h| h == header)?;
        self.records.get(row)?.get(index)
    }

    /// Number of exported rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no rows were exported.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Encode in the document's own format.
    pub fn encode(&self) -> Result<String, ExportError> {
        match self.format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Json => self.to_json(),
        }
    }

    /// CSV with a header line. Values use their plain display text.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for record in &self.records {
            writer.write_record(record.iter().map(display_value))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::CsvBuffer(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ExportError::CsvBuffer(e.to_string()))
    }

    /// JSON array of objects, keys in column order.
    pub fn to_json(&self) -> Result<String, ExportError> {
        let objects: Vec<IndexMap<&str, &CellValue>> = self
            .records
            .iter()
            .map(|record| self.fields.iter().map(String::as_str).zip(record).collect())
            .collect();
        Ok(serde_json::to_string_pretty(&objects)?)
    }
}
