//! `unitboard show`: units grouped by floor, highest floor first.

use std::sync::Arc;

use tabled::Tabled;

use unitboard_core::{Floor, Snapshot, Synchronizer, Unit, UnitStatus};

use crate::cli::{OutputFormat, ShowArgs, StatusFilter};
use crate::commands::{Context, summary_line};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "Floor")]
    floor: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Type")]
    unit_type: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Parking")]
    parking: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl UnitRow {
    fn new(unit: &Unit, color: bool) -> Self {
        Self {
            floor: unit.floor.to_string(),
            unit: unit.unit_id.clone(),
            unit_type: unit.unit_type.clone(),
            area: unit.area.clone(),
            parking: unit.parking.clone(),
            status: output::paint_status(unit.status, color),
        }
    }
}

fn detail(unit: &Unit, color: bool) -> String {
    output::detail_block(&[
        ("Unit", unit.unit_id.clone()),
        ("Floor", unit.floor.to_string()),
        ("Type", unit.unit_type.clone()),
        ("Area", unit.area.clone()),
        ("Parking", unit.parking.clone()),
        ("Status", output::paint_status(unit.status, color)),
    ])
}

// ── Filtering ───────────────────────────────────────────────────────

impl From<StatusFilter> for UnitStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Available => Self::Available,
            StatusFilter::OnHold => Self::OnHold,
            StatusFilter::Booked => Self::Booked,
            StatusFilter::Sold => Self::Sold,
        }
    }
}

/// Units in display order (floor groups, then source row order),
/// narrowed by the floor and status filters.
fn select(snapshot: &Snapshot, args: &ShowArgs) -> Vec<Arc<Unit>> {
    let floor = args.floor.map(Floor::Level);
    let status = args.status.map(UnitStatus::from);

    snapshot
        .by_floor()
        .iter()
        .filter(|group| floor.is_none_or(|f| group.floor == f))
        .flat_map(|group| group.units.iter())
        .filter(|unit| status.is_none_or(|s| unit.status == s))
        .cloned()
        .collect()
}

// ── Rendering ───────────────────────────────────────────────────────

/// Render the units view of `snapshot`.
pub fn render(snapshot: &Snapshot, args: &ShowArgs, ctx: &Context) -> Result<String, CliError> {
    if let Some(ref unit_id) = args.unit {
        let unit = snapshot
            .unit(unit_id.trim())
            .ok_or_else(|| CliError::UnitNotFound {
                unit_id: unit_id.clone(),
            })?;
        return output::render_single(
            ctx.output,
            unit,
            |u| detail(u, ctx.color),
            |u| u.unit_id.clone(),
        );
    }

    let units = select(snapshot, args);
    output::render_list(
        ctx.output,
        &units,
        |u| UnitRow::new(u, ctx.color),
        |u| u.unit_id.clone(),
    )
}

pub async fn handle(args: &ShowArgs, ctx: &Context) -> Result<(), CliError> {
    let snapshot = Synchronizer::oneshot(ctx.sync.clone()).await?;
    let rendered = render(&snapshot, args, ctx)?;
    output::print_output(&rendered, ctx.quiet);
    if ctx.output == OutputFormat::Table && args.unit.is_none() {
        output::print_note(&summary_line(&snapshot), ctx.quiet);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use unitboard_core::{SourceConfig, SourceLocation, SyncConfig, aggregate};

    use super::*;

    fn unit(id: &str, floor: Floor, status: UnitStatus) -> Unit {
        Unit {
            unit_id: id.into(),
            floor,
            unit_type: "2BR".into(),
            area: "1200".into(),
            parking: String::new(),
            status,
        }
    }

    fn snapshot() -> Snapshot {
        aggregate(
            vec![
                unit("1201", Floor::Level(12), UnitStatus::Available),
                unit("4502", Floor::Level(45), UnitStatus::Booked),
                unit("PH-A", Floor::Unknown, UnitStatus::Sold),
                unit("1202", Floor::Level(12), UnitStatus::Sold),
            ],
            Utc::now(),
            0,
        )
    }

    fn ctx(output: OutputFormat) -> Context {
        let location = SourceLocation::parse("https://example.com/units.csv").unwrap();
        Context {
            sync: SyncConfig::new(SourceConfig::new(location)),
            output,
            color: false,
            quiet: false,
        }
    }

    fn args(unit: Option<&str>, floor: Option<i32>, status: Option<StatusFilter>) -> ShowArgs {
        ShowArgs {
            unit: unit.map(str::to_owned),
            floor,
            status,
        }
    }

    #[test]
    fn plain_lists_highest_floor_first_and_unknown_last() {
        let out = render(&snapshot(), &args(None, None, None), &ctx(OutputFormat::Plain)).unwrap();
        assert_eq!(out, "4502\n1201\n1202\nPH-A");
    }

    #[test]
    fn filters_by_floor_and_status() {
        let snap = snapshot();
        let plain = ctx(OutputFormat::Plain);

        let out = render(&snap, &args(None, Some(12), None), &plain).unwrap();
        assert_eq!(out, "1201\n1202");

        let out = render(&snap, &args(None, None, Some(StatusFilter::Sold)), &plain).unwrap();
        assert_eq!(out, "1202\nPH-A");
    }

    #[test]
    fn single_unit_json_uses_wire_names() {
        let out = render(
            &snapshot(),
            &args(Some("4502"), None, None),
            &ctx(OutputFormat::JsonCompact),
        )
        .unwrap();
        assert!(out.contains(r#""type":"2BR""#), "{out}");
        assert!(out.contains(r#""status":"booked""#), "{out}");
        assert!(out.contains(r#""floor":45"#), "{out}");
    }

    #[test]
    fn unknown_unit_is_not_found() {
        let err = render(
            &snapshot(),
            &args(Some("9999"), None, None),
            &ctx(OutputFormat::Table),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::UnitNotFound { .. }));
    }
}
