//! `unitboard watch`: run the synchronizer and reprint on every change.
//!
//! A failed refresh never clears the screen; the last good view stays
//! up and a warning goes to stderr until the next success.

use std::io::{self, IsTerminal};

use unitboard_core::{SyncUpdate, Synchronizer};

use crate::cli::{OutputFormat, ShowArgs, WatchArgs};
use crate::commands::{Context, counts, show, summary_line};
use crate::error::CliError;
use crate::output;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub async fn handle(args: &WatchArgs, ctx: &Context) -> Result<(), CliError> {
    let sync = Synchronizer::new(ctx.sync.clone())?;
    let mut updates = sync.subscribe();
    let redraw = ctx.output == OutputFormat::Table && io::stdout().is_terminal();

    sync.start().await;

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            update = updates.changed() => {
                let Some(update) = update else { break Ok(()) };
                if let Err(err) = render_update(&update, args, ctx, redraw) {
                    break Err(err);
                }
            }
        }
    };

    sync.shutdown().await;
    result
}

fn render_update(
    update: &SyncUpdate,
    args: &WatchArgs,
    ctx: &Context,
    redraw: bool,
) -> Result<(), CliError> {
    if let Some(ref err) = update.error {
        let note = match update.snapshot {
            Some(ref snapshot) => format!(
                "refresh failed: {err} (showing data fetched {})",
                snapshot.fetched_at().format("%H:%M:%S UTC")
            ),
            None => format!("refresh failed: {err} (retrying)"),
        };
        output::print_note(&note, ctx.quiet);
        return Ok(());
    }

    let Some(ref snapshot) = update.snapshot else {
        return Ok(());
    };

    let rendered = if args.counts {
        counts::render(snapshot, ctx)?
    } else {
        let all = ShowArgs {
            unit: None,
            floor: None,
            status: None,
        };
        show::render(snapshot, &all, ctx)?
    };

    if redraw {
        print!("{CLEAR_SCREEN}");
    }
    output::print_output(&rendered, ctx.quiet);
    if ctx.output == OutputFormat::Table {
        output::print_note(&summary_line(snapshot), ctx.quiet);
    }
    Ok(())
}
