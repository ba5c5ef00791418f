// ── Snapshot domain types ──
//
// A snapshot is built once by the aggregator and never mutated after.
// Consumers hold it behind an `Arc`; a refresh swaps in a whole new one.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::unit::{Floor, Unit, UnitStatus};

/// How `Booked` is presented in count views.
///
/// The model always keeps `Booked` distinct; this only changes what a
/// consumer gets back from [`StatusCounts::view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookedPolicy {
    #[default]
    Distinct,
    MergeIntoSold,
}

/// Number of units per canonical status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub available: usize,
    pub on_hold: usize,
    pub booked: usize,
    pub sold: usize,
}

impl StatusCounts {
    /// Count statuses in one pass.
    pub fn tally<'a>(units: impl IntoIterator<Item = &'a Unit>) -> Self {
        let mut counts = Self::default();
        for unit in units {
            counts.record(unit.status);
        }
        counts
    }

    pub fn record(&mut self, status: UnitStatus) {
        *self.slot_mut(status) += 1;
    }

    pub fn get(&self, status: UnitStatus) -> usize {
        match status {
            UnitStatus::Available => self.available,
            UnitStatus::OnHold => self.on_hold,
            UnitStatus::Booked => self.booked,
            UnitStatus::Sold => self.sold,
        }
    }

    pub fn total(&self) -> usize {
        self.available + self.on_hold + self.booked + self.sold
    }

    /// Counts as a consumer should display them under `policy`.
    pub fn view(&self, policy: BookedPolicy) -> Self {
        match policy {
            BookedPolicy::Distinct => *self,
            BookedPolicy::MergeIntoSold => Self {
                booked: 0,
                sold: self.sold + self.booked,
                ..*self
            },
        }
    }

    /// `(status, count)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitStatus, usize)> + '_ {
        UnitStatus::iter().map(|s| (s, self.get(s)))
    }

    fn slot_mut(&mut self, status: UnitStatus) -> &mut usize {
        match status {
            UnitStatus::Available => &mut self.available,
            UnitStatus::OnHold => &mut self.on_hold,
            UnitStatus::Booked => &mut self.booked,
            UnitStatus::Sold => &mut self.sold,
        }
    }
}

/// All units on one floor, in source row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorGroup {
    pub floor: Floor,
    pub units: Vec<Arc<Unit>>,
}

/// Immutable, atomically-published view of the whole building.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    units: Vec<Arc<Unit>>,
    counts: StatusCounts,
    by_floor: Vec<FloorGroup>,
    fetched_at: DateTime<Utc>,
    discarded_rows: usize,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Snapshot {
    pub(crate) fn new(
        units: Vec<Arc<Unit>>,
        counts: StatusCounts,
        by_floor: Vec<FloorGroup>,
        fetched_at: DateTime<Utc>,
        discarded_rows: usize,
    ) -> Self {
        let index = units
            .iter()
            .enumerate()
            .map(|(pos, u)| (u.unit_id.clone(), pos))
            .collect();
        Self {
            units,
            counts,
            by_floor,
            fetched_at,
            discarded_rows,
            index,
        }
    }

    /// Units in source row order.
    pub fn units(&self) -> &[Arc<Unit>] {
        &self.units
    }

    pub fn counts(&self) -> &StatusCounts {
        &self.counts
    }

    /// Floors from highest to lowest, unknown floor last.
    pub fn by_floor(&self) -> &[FloorGroup] {
        &self.by_floor
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Source rows that did not become units (short rows, missing ids, duplicates).
    pub fn discarded_rows(&self) -> usize {
        self.discarded_rows
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Look up a unit by id.
    pub fn unit(&self, unit_id: &str) -> Option<&Arc<Unit>> {
        self.index.get(unit_id).and_then(|&pos| self.units.get(pos))
    }

    /// Units on a given floor.
    pub fn floor(&self, floor: Floor) -> Option<&FloorGroup> {
        self.by_floor.iter().find(|g| g.floor == floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, status: UnitStatus) -> Unit {
        Unit {
            unit_id: id.into(),
            floor: Floor::Level(1),
            unit_type: String::new(),
            area: String::new(),
            parking: String::new(),
            status,
        }
    }

    #[test]
    fn tally_counts_each_status() {
        let units = [
            unit("1", UnitStatus::Sold),
            unit("2", UnitStatus::Sold),
            unit("3", UnitStatus::OnHold),
            unit("4", UnitStatus::Available),
        ];
        let counts = StatusCounts::tally(&units);
        assert_eq!(counts.sold, 2);
        assert_eq!(counts.on_hold, 1);
        assert_eq!(counts.available, 1);
        assert_eq!(counts.booked, 0);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn merge_view_folds_booked_into_sold() {
        let counts = StatusCounts {
            available: 4,
            on_hold: 2,
            booked: 1,
            sold: 3,
        };
        let merged = counts.view(BookedPolicy::MergeIntoSold);
        assert_eq!(merged.booked, 0);
        assert_eq!(merged.sold, 4);
        assert_eq!(merged.total(), counts.total());
        assert_eq!(counts.view(BookedPolicy::Distinct), counts);
    }

    #[test]
    fn iter_follows_canonical_order() {
        let counts = StatusCounts {
            available: 4,
            on_hold: 2,
            booked: 1,
            sold: 3,
        };
        let pairs: Vec<_> = counts.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (UnitStatus::Available, 4),
                (UnitStatus::OnHold, 2),
                (UnitStatus::Booked, 1),
                (UnitStatus::Sold, 3),
            ]
        );
    }
}
