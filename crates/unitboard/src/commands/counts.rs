//! `unitboard counts`: per-status totals for the building.

use serde::Serialize;
use tabled::Tabled;

use unitboard_core::{BookedPolicy, Snapshot, StatusCounts, Synchronizer, UnitStatus};

use crate::cli::OutputFormat;
use crate::commands::{Context, summary_line};
use crate::error::CliError;
use crate::output;

/// Counts as shown to the user, after the booked policy is applied.
#[derive(Debug, Serialize)]
struct CountsReport {
    #[serde(flatten)]
    counts: StatusCounts,
    total: usize,
    booked_policy: BookedPolicy,
}

impl CountsReport {
    fn new(snapshot: &Snapshot, policy: BookedPolicy) -> Self {
        let counts = snapshot.counts().view(policy);
        Self {
            counts,
            total: counts.total(),
            booked_policy: policy,
        }
    }

    /// Status rows to display; `Booked` disappears once merged.
    fn statuses(&self) -> impl Iterator<Item = (UnitStatus, usize)> + '_ {
        let merged = self.booked_policy == BookedPolicy::MergeIntoSold;
        self.counts
            .iter()
            .filter(move |(status, _)| !(merged && *status == UnitStatus::Booked))
    }
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Units")]
    units: usize,
}

fn table(report: &CountsReport, color: bool) -> String {
    let mut rows: Vec<CountRow> = report
        .statuses()
        .map(|(status, units)| CountRow {
            status: output::paint_status(status, color),
            units,
        })
        .collect();
    rows.push(CountRow {
        status: "Total".into(),
        units: report.total,
    });
    output::render_table(&rows)
}

fn plain(report: &CountsReport) -> String {
    report
        .statuses()
        .map(|(status, units)| format!("{} {units}", plain_key(status)))
        .chain(std::iter::once(format!("total {}", report.total)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn plain_key(status: UnitStatus) -> &'static str {
    match status {
        UnitStatus::Available => "available",
        UnitStatus::OnHold => "on_hold",
        UnitStatus::Booked => "booked",
        UnitStatus::Sold => "sold",
    }
}

/// Render the counts view of `snapshot`.
pub fn render(snapshot: &Snapshot, ctx: &Context) -> Result<String, CliError> {
    let report = CountsReport::new(snapshot, ctx.sync.booked_policy);
    output::render_single(ctx.output, &report, |r| table(r, ctx.color), plain)
}

pub async fn handle(ctx: &Context) -> Result<(), CliError> {
    let snapshot = Synchronizer::oneshot(ctx.sync.clone()).await?;
    let rendered = render(&snapshot, ctx)?;
    output::print_output(&rendered, ctx.quiet);
    if ctx.output == OutputFormat::Table {
        output::print_note(&summary_line(&snapshot), ctx.quiet);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use unitboard_core::{Floor, SourceConfig, SourceLocation, SyncConfig, Unit, aggregate};

    use super::*;

    fn snapshot() -> Snapshot {
        let statuses = [
            UnitStatus::Available,
            UnitStatus::Available,
            UnitStatus::OnHold,
            UnitStatus::Booked,
            UnitStatus::Booked,
            UnitStatus::Sold,
        ];
        let units = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Unit {
                unit_id: format!("10{i}"),
                floor: Floor::Level(1),
                unit_type: String::new(),
                area: String::new(),
                parking: String::new(),
                status: *status,
            })
            .collect();
        aggregate(units, Utc::now(), 0)
    }

    fn ctx(output: OutputFormat, policy: BookedPolicy) -> Context {
        let location = SourceLocation::parse("https://example.com/units.csv").unwrap();
        let mut sync = SyncConfig::new(SourceConfig::new(location));
        sync.booked_policy = policy;
        Context {
            sync,
            output,
            color: false,
            quiet: false,
        }
    }

    #[test]
    fn plain_lists_every_status_and_total() {
        let out = render(&snapshot(), &ctx(OutputFormat::Plain, BookedPolicy::Distinct)).unwrap();
        assert_eq!(out, "available 2\non_hold 1\nbooked 2\nsold 1\ntotal 6");
    }

    #[test]
    fn merged_policy_folds_booked_into_sold() {
        let out =
            render(&snapshot(), &ctx(OutputFormat::Plain, BookedPolicy::MergeIntoSold)).unwrap();
        assert_eq!(out, "available 2\non_hold 1\nsold 3\ntotal 6");
    }

    #[test]
    fn json_is_flat_with_total() {
        let out =
            render(&snapshot(), &ctx(OutputFormat::JsonCompact, BookedPolicy::Distinct)).unwrap();
        assert_eq!(
            out,
            r#"{"available":2,"on_hold":1,"booked":2,"sold":1,"total":6,"booked_policy":"distinct"}"#
        );
    }

    #[test]
    fn table_ends_with_total_row() {
        let out = render(&snapshot(), &ctx(OutputFormat::Table, BookedPolicy::Distinct)).unwrap();
        assert!(out.contains("On Hold"));
        assert!(out.contains("Total"));
    }
}
