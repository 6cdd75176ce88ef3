use super::{process_file, FileOutcome};
use crate::conventions::Conventions;
use crate::passes::OffloadOutcome;
use crate::project::SourceLocator;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: bool,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Processed(_) => self.processed += 1,
            FileOutcome::Unchanged | FileOutcome::AlreadyProcessed => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Generated files directly inside `dir`, sorted by name.
pub fn generated_files(dir: &Path, conv: &Conventions) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_generated = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| conv.is_generated_file(n));
        if is_generated && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Log the status line for one file.
pub(crate) fn log_outcome(path: &Path, outcome: &FileOutcome) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match outcome {
        FileOutcome::Processed(report) => info!(
            "{}: {} (fragments: {}, native locals: {}, async: {})",
            name,
            outcome.status(),
            report.fragments,
            report.specialize.applied.len(),
            matches!(report.offload, OffloadOutcome::Offloaded { .. }),
        ),
        FileOutcome::Unchanged => info!("{}: {} (nothing to do)", name, outcome.status()),
        FileOutcome::AlreadyProcessed => {
            info!("{}: {} (already processed)", name, outcome.status())
        }
        FileOutcome::Failed(e) => warn!("{}: {} ({})", name, outcome.status(), e),
    }
}

/// Process every generated file in `dir`, one at a time.
///
/// `stop` is checked between files, so a file is never left half done.
pub fn run_batch(
    dir: &Path,
    locator: &dyn SourceLocator,
    conv: &Conventions,
    stop: &AtomicBool,
) -> io::Result<BatchSummary> {
    let files = generated_files(dir, conv)?;
    info!("Found {} generated file(s) in {}", files.len(), dir.display());

    let mut summary = BatchSummary::default();
    for path in &files {
        if stop.load(Ordering::SeqCst) {
            info!("Interrupted, stopping batch");
            summary.interrupted = true;
            break;
        }
        let outcome = process_file(path, locator, conv);
        log_outcome(path, &outcome);
        summary.record(&outcome);
    }

    info!(
        "Finished: {} processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );
    Ok(summary)
}
