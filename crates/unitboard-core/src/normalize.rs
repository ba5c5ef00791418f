// ── Row normalization ──
//
// Maps parsed `RowRecord`s onto canonical `Unit`s. Column names go
// through `ColumnAliases`, status cells through `StatusVocabulary`.
// A row without a unit id is discarded, never an error.

use std::collections::HashSet;

use tracing::debug;

use crate::model::{Floor, Unit};
use crate::parse::RowRecord;
use crate::vocabulary::{Column, ColumnAliases, StatusVocabulary};

/// Units produced from one batch of rows.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Units in source row order, ids unique.
    pub units: Vec<Unit>,
    /// Rows without a unit id, plus repeats of an id already seen.
    pub discarded: usize,
}

/// `RowRecord` → `Unit`.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    columns: ColumnAliases,
    statuses: StatusVocabulary,
}

impl Normalizer {
    pub fn new(columns: ColumnAliases, statuses: StatusVocabulary) -> Self {
        Self { columns, statuses }
    }

    pub fn columns(&self) -> &ColumnAliases {
        &self.columns
    }

    pub fn statuses(&self) -> &StatusVocabulary {
        &self.statuses
    }

    /// Normalize one row. `None` when the row has no unit id.
    pub fn normalize(&self, row: &RowRecord) -> Option<Unit> {
        let cell = |column| row.lookup(&self.columns, column).unwrap_or_default();

        let unit_id = cell(Column::Unit);
        if unit_id.is_empty() {
            return None;
        }

        let floor = parse_floor(cell(Column::Floor))
            .or_else(|| infer_floor(unit_id))
            .map_or(Floor::Unknown, Floor::Level);

        Some(Unit {
            unit_id: unit_id.to_owned(),
            floor,
            unit_type: cell(Column::Type).to_owned(),
            area: cell(Column::Area).to_owned(),
            parking: cell(Column::Parking).to_owned(),
            status: self.statuses.classify(cell(Column::Status)),
        })
    }

    /// Normalize a whole batch, keeping the first row for each unit id.
    pub fn normalize_all<'a>(&self, rows: impl IntoIterator<Item = &'a RowRecord>) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();
        let mut seen = HashSet::new();

        for row in rows {
            let Some(unit) = self.normalize(row) else {
                batch.discarded += 1;
                continue;
            };
            if !seen.insert(unit.unit_id.clone()) {
                debug!(unit_id = %unit.unit_id, "duplicate unit id, keeping first row");
                batch.discarded += 1;
                continue;
            }
            batch.units.push(unit);
        }

        batch
    }
}

/// Integer floor cell. Spreadsheet numeric exports (`"45.0"`) count as whole.
fn parse_floor(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(level) = raw.parse::<i32>() {
        return Some(level);
    }
    let (whole, fraction) = raw.split_once('.')?;
    if !fraction.chars().all(|c| c == '0') {
        return None;
    }
    whole.parse::<i32>().ok()
}

/// Floor from a numeric unit id: `4502` is on floor `45`.
fn infer_floor(unit_id: &str) -> Option<i32> {
    let id: i64 = unit_id.parse().ok()?;
    i32::try_from(id.div_euclid(100)).ok()
}
