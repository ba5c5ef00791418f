// ── Domain model ──
//
// Canonical types consumers depend on. Everything upstream of these
// (column names, status spellings, payload shape) is normalized away
// before a value of these types exists.

pub mod snapshot;
pub mod unit;

pub use snapshot::{BookedPolicy, FloorGroup, Snapshot, StatusCounts};
pub use unit::{Floor, Unit, UnitStatus};
