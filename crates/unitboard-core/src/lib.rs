//! Inventory sync engine between `unitboard-api` and its consumers.
//!
//! This crate turns a loosely maintained spreadsheet export into an
//! always-current, internally consistent view of a building's units:
//!
//! - **[`Synchronizer`]**: fetches immediately on
//!   [`start()`](Synchronizer::start), then on a fixed interval, with at
//!   most one fetch in flight. Success atomically publishes a new
//!   [`Snapshot`]; failure keeps the previous one and raises an error
//!   signal. [`Synchronizer::oneshot()`] runs a single cycle for
//!   one-off CLI invocations.
//!
//! - **Parsing** ([`parse`]): CSV text or the table-query JSON export into
//!   ordered [`RowRecord`]s, tolerant of header drift and short rows.
//!
//! - **Normalization** ([`normalize`]): rows into canonical [`Unit`]s via
//!   data-driven alias tables ([`ColumnAliases`], [`StatusVocabulary`]),
//!   with floor inference from numeric unit ids.
//!
//! - **Aggregation** ([`aggregate()`]): per-status counts and floors
//!   ordered highest first.
//!
//! - **[`SnapshotStream`]**: subscription handle that wakes on every
//!   publication and error change.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod parse;
mod store;
pub mod stream;
pub mod sync;
pub mod vocabulary;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::aggregate;
pub use config::{SourceConfig, SyncConfig, TlsVerification};
pub use error::CoreError;
pub use fetch::SheetFetcher;
pub use normalize::{NormalizedBatch, Normalizer};
pub use parse::{ParseError, ParsedTable, RowRecord, SourceFormat, TableParser};
pub use stream::{SnapshotStream, SnapshotWatchStream, SyncUpdate};
pub use sync::{RefreshOutcome, SyncPhase, Synchronizer};
pub use vocabulary::{Column, ColumnAliases, StatusVocabulary};

// Re-export model types at the crate root for ergonomics.
pub use model::{BookedPolicy, Floor, FloorGroup, Snapshot, StatusCounts, Unit, UnitStatus};

// Source construction lives in the api crate; consumers shouldn't need
// a direct dependency just to name a sheet.
pub use unitboard_api::{ExportFormat, SourceLocation};
