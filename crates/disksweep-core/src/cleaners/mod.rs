/// Category cleaners: one per class of disposable files.
///
/// Every cleaner composes the scanner and the reclaimer with its own roots,
/// patterns and predicate. Metrics live on the stack of one `execute` call,
/// so a cleaner can be run again (or concurrently) without resetting state.

pub mod aged_files;
pub mod browser_data;
pub mod dns_cache;
pub mod system_logs;
pub mod temp_files;

pub use aged_files::AgedFilesCleaner;
pub use browser_data::{BrowserDataCleaner, BrowserDataParts};
pub use dns_cache::DnsCacheCleaner;
pub use system_logs::{SystemLogsCleaner, SystemLogsParts};
pub use temp_files::TempFilesCleaner;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::model::{Category, Metrics};
use crate::reclaim::{ReclaimOutcome, Reclaimer};
use crate::scanner::{self, FileCandidate, ScanRoot};
use std::path::Path;
use tracing::{debug, warn};

/// The uniform contract the orchestrator drives.
pub trait CategoryCleaner: Send + Sync {
    fn category(&self) -> Category;

    /// Display name used in results and reports.
    fn name(&self) -> &'static str {
        self.category().label()
    }

    fn description(&self) -> &'static str;

    /// Bytes that `execute` would currently reclaim. Never modifies anything.
    fn estimate_size(&self, cancel: &CancelToken) -> Result<u64>;

    /// Reclaim everything this category targets.
    ///
    /// Per-file problems are skipped and logged; only cancellation or a
    /// failure of the whole category is returned as an error.
    fn execute(&self, cancel: &CancelToken) -> Result<Metrics>;
}

/// Scan `root` and reclaim every candidate accepted by `keep`.
///
/// A root that does not exist is skipped with a warning.
pub(crate) fn reclaim_scan(
    root: &ScanRoot,
    reclaimer: &Reclaimer,
    cancel: &CancelToken,
    metrics: &mut Metrics,
    keep: impl Fn(&FileCandidate) -> bool,
) -> Result<()> {
    if !root.path().is_dir() {
        warn!("Directory does not exist, skipping: {}", root.path().display());
        return Ok(());
    }

    let mut scan = scanner::scan(root, cancel)?;
    for candidate in scan.by_ref() {
        if !keep(&candidate) {
            continue;
        }
        record(metrics, &candidate.path, reclaimer.reclaim(&candidate.path));
    }
    cancel.check()?;

    let stats = scan.stats();
    debug!(
        "Finished {}: {} directories, {} unreadable, {} cycles and {} outside links skipped",
        root.path().display(),
        stats.dirs_visited,
        stats.dirs_unreadable,
        stats.cycles_skipped,
        stats.escapes_skipped
    );
    Ok(())
}

/// Sum the sizes of the candidates under `root` accepted by `keep`.
pub(crate) fn estimate_scan(
    root: &ScanRoot,
    cancel: &CancelToken,
    keep: impl Fn(&FileCandidate) -> bool,
) -> Result<u64> {
    if !root.path().is_dir() {
        return Ok(0);
    }
    let total = scanner::scan(root, cancel)?
        .filter(|c| keep(c))
        .map(|c| c.size)
        .sum();
    cancel.check()?;
    Ok(total)
}

/// Reclaim one named file if it exists.
pub(crate) fn reclaim_file(path: &Path, reclaimer: &Reclaimer, metrics: &mut Metrics) {
    if path.is_file() {
        record(metrics, path, reclaimer.reclaim(path));
    }
}

/// Size of one named file, zero if absent.
pub(crate) fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map_or(0, |m| m.len())
}

fn record(metrics: &mut Metrics, path: &Path, outcome: ReclaimOutcome) {
    match outcome {
        ReclaimOutcome::Reclaimed { bytes } => metrics.record_reclaimed(bytes),
        // Another category (or the OS) got there first.
        ReclaimOutcome::Missing => debug!("Already gone: {}", path.display()),
        ReclaimOutcome::InUse | ReclaimOutcome::Failed(_) => metrics.record_skipped(),
    }
}
