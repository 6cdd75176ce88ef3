use super::batch::log_outcome;
use super::process_file;
use crate::conventions::Conventions;
use crate::project::SourceLocator;
use notify::{recommended_watcher, EventKind, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{info, warn};

const POLL: Duration = Duration::from_millis(250);

/// Re-process generated files in `dir` whenever the generator touches them,
/// until `stop` is set.
///
/// The tool's own rewrite shows up as another modify event; the processed
/// stamp turns that one into a no-op.
pub fn watch(
    dir: &Path,
    locator: &dyn SourceLocator,
    conv: &Conventions,
    stop: &AtomicBool,
) -> notify::Result<()> {
    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
    let mut watcher = recommended_watcher(tx)?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    info!("Watching {}", dir.display());

    while !stop.load(Ordering::SeqCst) {
        let event = match rx.recv_timeout(POLL) {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                warn!("watch error: {}", e);
                continue;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            continue;
        }
        for path in &event.paths {
            let is_generated = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| conv.is_generated_file(n));
            if !is_generated || !path.is_file() {
                continue;
            }
            let outcome = process_file(path, locator, conv);
            log_outcome(path, &outcome);
        }
    }

    info!("Stopped watching {}", dir.display());
    Ok(())
}
