// ── Table parsing ──
//
// Turns a raw payload into ordered row records. Two wire shapes are
// accepted (delimited text and the table-query JSON), and both end up in
// the same header + cells form before the shared shape rules run. A row
// that does not fit is dropped and counted; only a payload that cannot
// be read at all is an error.

mod csv;
mod table_json;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::vocabulary::{Column, ColumnAliases, fold_key};

/// Payload shape expected from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    /// Sniff the payload.
    #[default]
    Auto,
    Csv,
    JsonTable,
}

impl SourceFormat {
    /// Pick a concrete format for `payload`.
    pub fn detect(payload: &str) -> Self {
        let head = table_json::head(payload);
        if head.starts_with('{')
            || head.starts_with(table_json::WRAPPER_MARKER)
            || head
                .get(..table_json::WRAPPER_PREFIX_LEN.min(head.len()))
                .is_some_and(|p| p.contains(table_json::WRAPPER_CALL))
        {
            Self::JsonTable
        } else {
            Self::Csv
        }
    }
}

/// Errors that reject a whole payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("payload is empty")]
    Empty,

    #[error("no unit column in header [{}]", header.join(", "))]
    MissingUnitColumn { header: Vec<String> },

    #[error("payload too short for the table-query wrapper ({len} bytes)")]
    WrapperTooShort { len: usize },

    #[error("invalid JSON table: {0}")]
    Json(String),

    #[error("JSON response has no table")]
    MissingTable,

    #[error("source reported an error: {message}")]
    Source { message: String },
}

/// One source row: folded column name → trimmed cell text, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRecord {
    fields: IndexMap<String, String>,
}

impl RowRecord {
    /// Cell for a folded column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Cell for the first column whose name resolves to `column`.
    pub fn lookup(&self, aliases: &ColumnAliases, column: Column) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| aliases.resolve(name) == Some(column))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert_first(&mut self, column: String, value: String) {
        self.fields.entry(column).or_insert(value);
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::default();
        for (k, v) in iter {
            record.insert_first(fold_key(k.as_ref()), v.as_ref().trim().to_owned());
        }
        record
    }
}

/// Result of parsing one payload.
#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    /// Folded header names, in source order.
    pub header: Vec<String>,
    pub rows: Vec<RowRecord>,
    /// Rows that were present but too short to use.
    pub dropped: usize,
}

/// Payload → row records.
#[derive(Debug, Clone, Default)]
pub struct TableParser {
    columns: ColumnAliases,
}

impl TableParser {
    pub fn new(columns: ColumnAliases) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &ColumnAliases {
        &self.columns
    }

    /// Parse a payload in the given (or sniffed) format.
    pub fn parse(&self, payload: &str, format: SourceFormat) -> Result<ParsedTable, ParseError> {
        if payload.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let format = match format {
            SourceFormat::Auto => SourceFormat::detect(payload),
            other => other,
        };

        let grid = match format {
            SourceFormat::JsonTable => table_json::read(payload)?,
            SourceFormat::Csv | SourceFormat::Auto => csv::read(payload),
        };

        let table = self.shape(grid, format)?;
        debug!(
            ?format,
            rows = table.rows.len(),
            dropped = table.dropped,
            "payload parsed"
        );
        Ok(table)
    }

    /// Apply header resolution and the minimum-width rule.
    fn shape(&self, grid: Grid, format: SourceFormat) -> Result<ParsedTable, ParseError> {
        let mut records = grid.records.into_iter();
        let raw_header: Vec<String> = match grid.header {
            Some(h) => h,
            None => records.next().ok_or(ParseError::Empty)?,
        };
        let mut header: Vec<String> = raw_header.iter().map(|h| fold_key(h)).collect();

        let mut leading_data = None;
        if self.position(&header, Column::Unit).is_none() {
            // Header-less export: the first line is already a unit row.
            let looks_like_data = format == SourceFormat::Csv
                && raw_header
                    .first()
                    .is_some_and(|c| c.trim().parse::<i64>().is_ok());
            if !looks_like_data {
                return Err(ParseError::MissingUnitColumn { header });
            }
            header = Column::POSITIONAL.iter().map(ToString::to_string).collect();
            leading_data = Some(raw_header);
        }

        let min_cells = self.min_cells(&header);
        let mut table = ParsedTable {
            header,
            ..ParsedTable::default()
        };

        for cells in leading_data.into_iter().chain(records) {
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            if cells.len() < min_cells {
                table.dropped += 1;
                continue;
            }
            let record: RowRecord = table
                .header
                .iter()
                .zip(cells.iter())
                .filter(|(name, _)| !name.is_empty())
                .collect();
            table.rows.push(record);
        }

        Ok(table)
    }

    fn position(&self, header: &[String], column: Column) -> Option<usize> {
        header
            .iter()
            .position(|h| self.columns.resolve(h) == Some(column))
    }

    /// Cells a row needs to cover every required column the header has.
    ///
    /// With a floor column all six canonical columns count; without one
    /// only unit and status do, and floor is inferred later.
    fn min_cells(&self, header: &[String]) -> usize {
        let required: &[Column] = if self.position(header, Column::Floor).is_some() {
            &Column::POSITIONAL
        } else {
            &[Column::Unit, Column::Status]
        };
        required
            .iter()
            .filter_map(|c| self.position(header, *c))
            .max()
            .map_or(0, |last| last + 1)
    }
}

/// Header plus cell rows, before any column semantics are applied.
#[derive(Debug)]
pub(crate) struct Grid {
    /// `None` when the first record doubles as the header.
    header: Option<Vec<String>>,
    records: Vec<Vec<String>>,
}
