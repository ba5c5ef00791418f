//! Command handlers.
//!
//! Each data command works against a resolved [`Context`]; config and
//! completions are dispatched from `main` before any sheet is touched.

pub mod config_cmd;
pub mod counts;
pub mod show;
pub mod watch;

use unitboard_core::{Snapshot, SyncConfig};

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Everything a data command needs, resolved once from flags + config.
#[derive(Debug, Clone)]
pub struct Context {
    pub sync: SyncConfig,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

/// Route a data command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Show(args) => show::handle(&args, ctx).await,
        Command::Counts => counts::handle(ctx).await,
        Command::Watch(args) => watch::handle(&args, ctx).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// One-line provenance note printed under human-readable views.
pub fn summary_line(snapshot: &Snapshot) -> String {
    let mut line = format!(
        "{} units, fetched {}",
        snapshot.len(),
        snapshot.fetched_at().format("%Y-%m-%d %H:%M:%S UTC"),
    );
    if snapshot.discarded_rows() > 0 {
        line.push_str(&format!(", {} rows skipped", snapshot.discarded_rows()));
    }
    line
}
