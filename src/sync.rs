// Sync engine: diff the two chart indices, then copy every missing
// version from the source to the destination, one archive at a time.

use crate::api::ApiClient;
use crate::error::{self, ApiError, SyncError, TransferError};
use crate::index::{self, DiffResult};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

/// Outcome of a transfer run. Advisory only: failed items are logged as
/// they happen and never fail the run as a whole.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Number of (chart, version) pairs the diff asked for.
    pub planned: usize,
    /// Number of pairs both fetched and uploaded.
    pub synced: usize,
    pub failures: Vec<TransferError>,
}

impl SyncReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// List both servers and compute what is missing on the destination.
///
/// Both listings are always attempted so that a failure on one side does
/// not hide a failure on the other.
pub fn plan(source: &ApiClient, destination: &ApiClient) -> Result<DiffResult, SyncError> {
    let source_index = source.list_charts();
    let destination_index = destination.list_charts();

    match (source_index, destination_index) {
        (Ok(source_index), Ok(destination_index)) => {
            let diff = index::diff(&source_index, &destination_index);
            info!(
                source_charts = source_index.len(),
                destination_charts = destination_index.len(),
                missing = diff.total(),
                "Compared chart indices"
            );
            Ok(diff)
        }
        (source_index, destination_index) => Err(SyncError::Listing {
            source_listing: source_index.err(),
            destination_listing: destination_index.err(),
        }),
    }
}

/// Copy every pair in `diff`. `progress` is sized to the diff total and
/// advanced once per successful copy.
pub fn transfer(
    source: &ApiClient,
    destination: &ApiClient,
    diff: &DiffResult,
    progress: &ProgressBar,
) -> SyncReport {
    let mut report = SyncReport {
        planned: diff.total(),
        ..SyncReport::default()
    };
    progress.set_length(report.planned as u64);

    for (chart, version) in diff.iter() {
        match transfer_one(source, destination, chart, version) {
            Ok(()) => {
                report.synced += 1;
                debug!(chart, version, "Synced chart version");
                progress.set_message(format!("{}-{}", chart, version));
                progress.inc(1);
            }
            Err(err) => {
                progress.suspend(|| {
                    warn!(
                        chart,
                        version,
                        server = %failed_server(&err),
                        error = %error::chain(&err),
                        "Chart transfer failed"
                    )
                });
                report.failures.push(err);
            }
        }
    }

    report
}

/// `plan` followed by `transfer`. Listing failures abort before any
/// archive is requested.
pub fn sync(
    source: &ApiClient,
    destination: &ApiClient,
    progress: &ProgressBar,
) -> Result<SyncReport, SyncError> {
    let diff = plan(source, destination)?;
    Ok(transfer(source, destination, &diff, progress))
}

fn transfer_one(
    source: &ApiClient,
    destination: &ApiClient,
    chart: &str,
    version: &str,
) -> Result<(), TransferError> {
    let archive = source.fetch_archive(chart, version).map_err(|cause| {
        let chart = chart.to_string();
        let version = version.to_string();
        let server = source.base_url().to_string();
        match cause {
            ApiError::Body { .. } => TransferError::Read { chart, version, server, cause },
            _ => TransferError::Fetch { chart, version, server, cause },
        }
    })?;

    destination
        .upload_archive(archive)
        .map_err(|cause| TransferError::Upload {
            chart: chart.to_string(),
            version: version.to_string(),
            server: destination.base_url().to_string(),
            cause,
        })
}

fn failed_server(err: &TransferError) -> &str {
    match err {
        TransferError::Fetch { server, .. }
        | TransferError::Read { server, .. }
        | TransferError::Upload { server, .. } => server,
    }
}
