// Top-level run: the sequence the binary performs, minus the printing.
// `main` turns the outcome into output and an exit status.

use crate::api::ApiClient;
use crate::config::Cli;
use crate::index::DiffResult;
use crate::sync::{self, SyncReport};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::info;

/// How a run ended when nothing fatal happened.
#[derive(Debug)]
pub enum Outcome {
    /// Neither endpoint was given; no request was made.
    Usage,
    /// `--dry-run`: what would have been copied.
    Planned(DiffResult),
    Synced {
        report: SyncReport,
        progress: ProgressBar,
    },
}

/// Probe both servers, then plan (dry run) or sync.
///
/// A failed probe or listing is returned as an error before any archive is
/// requested. `make_progress` is only called once a transfer is about to
/// start.
pub fn run<F>(cli: &Cli, make_progress: F) -> Result<Outcome>
where
    F: FnOnce() -> Result<ProgressBar>,
{
    let Some(endpoints) = cli.endpoints() else {
        return Ok(Outcome::Usage);
    };

    let source = ApiClient::new(&endpoints.source)?;
    let destination = ApiClient::new(&endpoints.destination)?;

    let source_info = source
        .probe()
        .with_context(|| format!("Error checking source: {}", source.info_url()))?;
    info!(server = %source.base_url(), version = %source_info.version, "Source is reachable");

    let destination_info = destination
        .probe()
        .with_context(|| format!("Error checking destination: {}", destination.info_url()))?;
    info!(server = %destination.base_url(), version = %destination_info.version, "Destination is reachable");

    let diff = sync::plan(&source, &destination)?;
    if cli.dry_run {
        return Ok(Outcome::Planned(diff));
    }

    let progress = make_progress()?;
    let report = sync::transfer(&source, &destination, &diff, &progress);
    Ok(Outcome::Synced { report, progress })
}
