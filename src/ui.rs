// UI layer: everything the binary prints. Logging goes through tracing;
// this module owns the usage text, the progress bar and the plain
// stdout lines a user reads after a run.

use crate::config::DEFAULT_URL;
use crate::index::DiffResult;
use crate::sync::SyncReport;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// Printed when neither a source nor a destination was given.
pub fn usage_guidance() -> String {
    [
        "You must have at least one source or one destination.".to_string(),
        "cm-sync -s http://source_url -d http://destination_url".to_string(),
        format!("if you omit either of them, {} will be used instead", DEFAULT_URL),
        format!("cm-sync -s http://source_url (*implies -d {})", DEFAULT_URL),
        "---".to_string(),
        "chartmuseum --storage local --storage-local-rootdir /tmp/chartmuseum/ --port 8080"
            .to_string(),
    ]
    .join("\n")
}

/// Progress bar for the transfer loop. Its length is set by
/// `sync::transfer` once the diff is known.
pub fn sync_progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "Syncing Charts [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        )?
        .progress_chars("=>-"),
    );
    Ok(pb)
}

/// One line per chart version a dry run would copy.
pub fn render_plan(diff: &DiffResult) -> String {
    if diff.is_empty() {
        return "Destination is up to date, nothing to sync.\n".to_string();
    }
    let mut out = format!("{} chart version(s) missing on destination:\n", diff.total());
    for (chart, version) in diff.iter() {
        out.push_str(&format!("  {}-{}\n", chart, version));
    }
    out
}

pub fn render_summary(report: &SyncReport) -> String {
    format!(
        "Synced {} of {} chart version(s), {} failed",
        report.synced,
        report.planned,
        report.failed()
    )
}
