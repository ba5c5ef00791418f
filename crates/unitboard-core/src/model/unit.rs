// ── Unit domain types ──

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical sale status, normalized from whatever the sheet says.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    OnHold,
    Booked,
    Sold,
}

impl UnitStatus {
    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::OnHold => "On Hold",
            Self::Booked => "Booked",
            Self::Sold => "Sold",
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    pub(crate) fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Available => &["available", "avail", ""],
            Self::OnHold => &["on hold", "on-hold", "hold"],
            Self::Booked => &["booked", "reserve", "reserved"],
            Self::Sold => &["sold", "closed"],
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Floor a unit sits on.
///
/// `Unknown` covers units whose floor was missing and whose id was not
/// numeric, so nothing could be inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<i32>", into = "Option<i32>")]
pub enum Floor {
    Level(i32),
    Unknown,
}

impl Floor {
    pub fn level(self) -> Option<i32> {
        match self {
            Self::Level(n) => Some(n),
            Self::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Self::Level(_))
    }

    /// Display ordering: nonzero levels highest first, then level 0,
    /// then `Unknown`.
    pub fn display_cmp(self, other: Self) -> Ordering {
        match (self, other) {
            (Self::Level(a), Self::Level(b)) => (a == 0).cmp(&(b == 0)).then(b.cmp(&a)),
            (Self::Level(_), Self::Unknown) => Ordering::Less,
            (Self::Unknown, Self::Level(_)) => Ordering::Greater,
            (Self::Unknown, Self::Unknown) => Ordering::Equal,
        }
    }
}

impl From<Option<i32>> for Floor {
    fn from(value: Option<i32>) -> Self {
        value.map_or(Self::Unknown, Self::Level)
    }
}

impl From<Floor> for Option<i32> {
    fn from(value: Floor) -> Self {
        value.level()
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

/// A sellable unit, as published in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Identifier from the sheet (e.g. `"4502"`). Unique within a snapshot.
    pub unit_id: String,
    pub floor: Floor,
    /// Layout description (`"2BR"`, `"Penthouse"`...). Opaque.
    #[serde(rename = "type")]
    pub unit_type: String,
    /// Area as written in the sheet; units of measure are not interpreted.
    pub area: String,
    pub parking: String,
    pub status: UnitStatus,
}
