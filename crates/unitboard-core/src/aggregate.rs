// ── Snapshot aggregation ──
//
// Pure function from normalized units to a published `Snapshot`.
// Counts are taken in the same pass that partitions units by floor.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::model::{Floor, FloorGroup, Snapshot, StatusCounts, Unit};

/// Build a snapshot from units in source order.
///
/// Floors are ordered highest first with the unknown floor last; units
/// keep their source order inside each floor.
pub fn aggregate(units: Vec<Unit>, fetched_at: DateTime<Utc>, discarded_rows: usize) -> Snapshot {
    let units: Vec<Arc<Unit>> = units.into_iter().map(Arc::new).collect();

    let mut counts = StatusCounts::default();
    let mut slots: HashMap<Floor, usize> = HashMap::new();
    let mut by_floor: Vec<FloorGroup> = Vec::new();

    for unit in &units {
        counts.record(unit.status);
        let slot = *slots.entry(unit.floor).or_insert_with(|| {
            by_floor.push(FloorGroup {
                floor: unit.floor,
                units: Vec::new(),
            });
            by_floor.len() - 1
        });
        if let Some(group) = by_floor.get_mut(slot) {
            group.units.push(Arc::clone(unit));
        }
    }

    // Stable sort; floors are distinct so only the group order changes.
    by_floor.sort_by(|a, b| a.floor.display_cmp(b.floor));

    Snapshot::new(units, counts, by_floor, fetched_at, discarded_rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::UnitStatus;
    use pretty_assertions::assert_eq;

    fn unit(id: &str, floor: Floor, status: UnitStatus) -> Unit {
        Unit {
            unit_id: id.into(),
            floor,
            unit_type: String::new(),
            area: String::new(),
            parking: String::new(),
            status,
        }
    }

    fn ids(group: &FloorGroup) -> Vec<&str> {
        group.units.iter().map(|u| u.unit_id.as_str()).collect()
    }

    #[test]
    fn groups_floors_descending_in_source_order() {
        let snap = aggregate(
            vec![
                unit("u1", Floor::Level(7), UnitStatus::Available),
                unit("u3", Floor::Level(3), UnitStatus::Available),
                unit("u2", Floor::Level(7), UnitStatus::Sold),
            ],
            Utc::now(),
            0,
        );
        let floors: Vec<_> = snap.by_floor().iter().map(|g| g.floor).collect();
        assert_eq!(floors, vec![Floor::Level(7), Floor::Level(3)]);
        assert_eq!(ids(&snap.by_floor()[0]), vec!["u1", "u2"]);
        assert_eq!(ids(&snap.by_floor()[1]), vec!["u3"]);
    }

    #[test]
    fn zero_and_unknown_floors_sort_last() {
        let snap = aggregate(
            vec![
                unit("PH", Floor::Unknown, UnitStatus::Available),
                unit("101", Floor::Level(1), UnitStatus::Available),
                unit("G1", Floor::Level(0), UnitStatus::Available),
                unit("B1", Floor::Level(-1), UnitStatus::Available),
            ],
            Utc::now(),
            0,
        );
        let floors: Vec<_> = snap.by_floor().iter().map(|g| g.floor).collect();
        assert_eq!(
            floors,
            vec![
                Floor::Level(1),
                Floor::Level(-1),
                Floor::Level(0),
                Floor::Unknown
            ]
        );
    }

    #[test]
    fn counts_match_status_tallies() {
        let statuses = [
            UnitStatus::Available,
            UnitStatus::Available,
            UnitStatus::Available,
            UnitStatus::Available,
            UnitStatus::OnHold,
            UnitStatus::OnHold,
            UnitStatus::Booked,
            UnitStatus::Sold,
            UnitStatus::Sold,
            UnitStatus::Sold,
        ];
        let units = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| unit(&format!("{}", 100 + i), Floor::Level(1), *s))
            .collect();
        let snap = aggregate(units, Utc::now(), 3);
        let counts = snap.counts();
        assert_eq!(counts.total(), 10);
        assert_eq!(counts.available, 4);
        assert_eq!(counts.on_hold, 2);
        assert_eq!(counts.booked, 1);
        assert_eq!(counts.sold, 3);
        assert_eq!(snap.discarded_rows(), 3);
    }

    #[test]
    fn snapshot_lookups() {
        let now = Utc::now();
        let snap = aggregate(
            vec![
                unit("4502", Floor::Level(45), UnitStatus::Booked),
                unit("4401", Floor::Level(44), UnitStatus::Sold),
            ],
            now,
            0,
        );
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.fetched_at(), now);
        assert_eq!(snap.unit("4401").unwrap().status, UnitStatus::Sold);
        assert!(snap.unit("9999").is_none());
        assert_eq!(ids(snap.floor(Floor::Level(45)).unwrap()), vec!["4502"]);
        assert!(snap.floor(Floor::Unknown).is_none());
    }

    #[test]
    fn empty_input_gives_empty_snapshot() {
        let snap = aggregate(Vec::new(), Utc::now(), 0);
        assert!(snap.is_empty());
        assert!(snap.by_floor().is_empty());
        assert_eq!(snap.counts().total(), 0);
    }
}
