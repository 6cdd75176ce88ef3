mod batch;
mod watch;

pub use batch::{generated_files, run_batch, BatchSummary};
pub use watch::watch;

use crate::annotations;
use crate::conventions::Conventions;
use crate::document::{Document, GeneratedFunction};
use crate::error::WeaveError;
use crate::passes::{self, OffloadOutcome, SpecializeReport, WeaveMode};
use crate::project::SourceLocator;
use std::fs;
use std::path::Path;
use tracing::debug;

/// First line of every file this tool has rewritten.
pub const PROCESSED_STAMP: &str = "/* processed by native-weaver */";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub fragments: usize,
    pub dropped_fragments: usize,
    pub mode: Option<WeaveMode>,
    pub specialize: SpecializeReport,
    pub offload: OffloadOutcome,
}

#[derive(Debug)]
pub enum FileOutcome {
    Processed(FileReport),
    /// Nothing in the script source asked for a change.
    Unchanged,
    /// The file already carries the processed stamp.
    AlreadyProcessed,
    Failed(WeaveError),
}

impl FileOutcome {
    /// One-word status for the per-file log line.
    pub fn status(&self) -> &'static str {
        match self {
            FileOutcome::Processed(_) => "processed",
            FileOutcome::Unchanged | FileOutcome::AlreadyProcessed => "skipped",
            FileOutcome::Failed(_) => "error",
        }
    }
}

pub fn is_stamped(text: &str) -> bool {
    text.lines().next().map(str::trim_end) == Some(PROCESSED_STAMP)
}

/// Run every pass over one generated file's text.
///
/// Weaving happens before specialization so declarations inside woven code
/// are seen too; offloading comes last because it moves the body.
pub fn transform(
    generated: &str,
    function: GeneratedFunction,
    source: &str,
    conv: &Conventions,
) -> Result<(String, FileReport), WeaveError> {
    let annotations = annotations::scan(source, conv)?;
    let mut doc = Document::parse(generated, function, conv)?;

    let mode = passes::weave(&mut doc, &annotations.fragments, conv)?;
    let specialize = passes::specialize(&mut doc, &annotations.declarations, conv);
    let offload = passes::offload(&mut doc, annotations.run_async, conv);

    let report = FileReport {
        fragments: annotations.fragments.len(),
        dropped_fragments: annotations.dropped_fragments,
        mode,
        specialize,
        offload,
    };
    Ok((doc.render(), report))
}

/// Read, transform and rewrite one generated file in place.
pub fn process_file(path: &Path, locator: &dyn SourceLocator, conv: &Conventions) -> FileOutcome {
    match try_process_file(path, locator, conv) {
        Ok(outcome) => outcome,
        Err(e) => FileOutcome::Failed(e),
    }
}

fn try_process_file(
    path: &Path,
    locator: &dyn SourceLocator,
    conv: &Conventions,
) -> Result<FileOutcome, WeaveError> {
    let generated = fs::read_to_string(path).map_err(|e| WeaveError::io(path, e))?;
    if is_stamped(&generated) {
        return Ok(FileOutcome::AlreadyProcessed);
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let function = GeneratedFunction::from_file_name(&file_name, conv)
        .ok_or_else(|| WeaveError::FunctionSignatureNotFound(file_name.clone()))?;

    let source_path = locator.locate(&function);
    let source = fs::read_to_string(&source_path)
        .map_err(|_| WeaveError::SourceNotFound(source_path.clone()))?;
    debug!("{} <- {}", file_name, source_path.display());

    let (text, report) = transform(&generated, function, &source, conv)?;
    if text == generated {
        return Ok(FileOutcome::Unchanged);
    }

    let stamped = format!("{}\n{}", PROCESSED_STAMP, text);
    fs::write(path, stamped).map_err(|e| WeaveError::io(path, e))?;
    Ok(FileOutcome::Processed(report))
}
