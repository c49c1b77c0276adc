/// Scanner module: cycle-safe, depth-bounded, cancellable file enumeration.
///
/// [`scan`] starts a producer thread that walks the tree depth-first and
/// sends [`FileCandidate`]s through a bounded channel. The returned [`Scan`]
/// is a lazy, single-pass iterator over that channel: consuming it drives the
/// traversal, and dropping it stops the producer at its next send.
///
/// Failure handling is local. An unreadable directory loses its own subtree
/// and nothing else; a directory already open higher up the recursion stack
/// (a symlink or junction cycle) is skipped with a warning, and so is a
/// directory link pointing outside the root.
pub mod visited;
mod walk;

pub use visited::{VisitedFrame, VisitedSet};

use crate::cancel::CancelToken;
use crate::error::{CleanError, Result};
use crossbeam_channel::Receiver;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::SystemTime;
use tracing::debug;
use walk::Walker;

/// Default recursion limit used by every category cleaner.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Number of candidates the producer may run ahead of the consumer.
pub const SCAN_CHANNEL_CAPACITY: usize = 100;

/// File-name matching: case-insensitive where the filesystem is.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: !cfg!(windows),
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A directory to scan, the file-name patterns to report, and a depth limit.
///
/// An empty pattern list matches every file.
#[derive(Debug, Clone)]
pub struct ScanRoot {
    path: PathBuf,
    patterns: Vec<Pattern>,
    max_depth: Option<usize>,
}

impl ScanRoot {
    /// Every file under `path`, to [`DEFAULT_MAX_DEPTH`].
    pub fn all(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            patterns: Vec::new(),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }

    /// Files whose name matches the glob `pattern`, to [`DEFAULT_MAX_DEPTH`].
    pub fn new(path: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        Self::with_patterns(path, &[pattern])
    }

    /// Files whose name matches any of `patterns`.
    pub fn with_patterns(path: impl Into<PathBuf>, patterns: &[&str]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| CleanError::Pattern {
                    pattern: (*p).to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            path: path.into(),
            patterns,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        })
    }

    /// Limit recursion: files nested deeper than `depth` levels below the
    /// root are not reported. `0` means the root directory only.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Remove the depth limit.
    pub fn unbounded(mut self) -> Self {
        self.max_depth = None;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn depth_limit(&self) -> usize {
        self.max_depth.unwrap_or(usize::MAX)
    }

    /// Whether a file name matches this root's patterns.
    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns.is_empty()
            || self
                .patterns
                .iter()
                .any(|p| p.matches_with(file_name, MATCH_OPTIONS))
    }
}

/// One file produced by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub size: u64,
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
}

impl FileCandidate {
    /// True if *either* timestamp is strictly before `cutoff`.
    ///
    /// A file with neither timestamp never qualifies.
    pub fn is_older_than(&self, cutoff: SystemTime) -> bool {
        self.created.is_some_and(|t| t < cutoff) || self.modified.is_some_and(|t| t < cutoff)
    }
}

/// Shared traversal counters, written by the producer thread.
#[derive(Debug, Default)]
pub(crate) struct ScanCounters {
    dirs_visited: AtomicU64,
    dirs_unreadable: AtomicU64,
    cycles_skipped: AtomicU64,
    escapes_skipped: AtomicU64,
}

/// Snapshot of a scan's traversal counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub dirs_visited: u64,
    pub dirs_unreadable: u64,
    pub cycles_skipped: u64,
    /// Directory links whose target lies outside the root.
    pub escapes_skipped: u64,
}

/// Lazy, single-pass sequence of candidates. Not restartable.
pub struct Scan {
    rx: Receiver<FileCandidate>,
    cancel: CancelToken,
    counters: Arc<ScanCounters>,
}

impl Scan {
    /// Counters so far. Final once the iterator has returned `None` and the
    /// producer has exited.
    pub fn stats(&self) -> ScanStats {
        ScanStats {
            dirs_visited: self.counters.dirs_visited.load(Ordering::Relaxed),
            dirs_unreadable: self.counters.dirs_unreadable.load(Ordering::Relaxed),
            cycles_skipped: self.counters.cycles_skipped.load(Ordering::Relaxed),
            escapes_skipped: self.counters.escapes_skipped.load(Ordering::Relaxed),
        }
    }
}

impl Iterator for Scan {
    type Item = FileCandidate;

    fn next(&mut self) -> Option<FileCandidate> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.rx.recv().ok()
    }
}

/// Start scanning `root`. Traversal proceeds as the returned [`Scan`] is
/// consumed and stops as soon as `cancel` is triggered.
pub fn scan(root: &ScanRoot, cancel: &CancelToken) -> Result<Scan> {
    let (tx, rx) = crossbeam_channel::bounded::<FileCandidate>(SCAN_CHANNEL_CAPACITY);
    let counters = Arc::new(ScanCounters::default());

    let root_clone = root.clone();
    let cancel_clone = cancel.clone();
    let counters_clone = Arc::clone(&counters);

    thread::Builder::new()
        .name("disksweep-scanner".into())
        .spawn(move || {
            debug!("Scanning {}", root_clone.path().display());
            Walker {
                root: &root_clone,
                tx,
                cancel: cancel_clone,
                counters: &counters_clone,
            }
            .run();
        })
        .map_err(|e| CleanError::Thread(format!("failed to spawn scanner thread: {e}")))?;

    Ok(Scan {
        rx,
        cancel: cancel.clone(),
        counters,
    })
}

/// Sum of the sizes of every candidate under `root`.
pub fn estimate_size(root: &ScanRoot, cancel: &CancelToken) -> Result<u64> {
    let total = scan(root, cancel)?.map(|c| c.size).sum();
    cancel.check()?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_pattern_list_matches_everything() {
        let root = ScanRoot::all("/tmp");
        assert!(root.matches("anything.bin"));
        assert!(root.matches(".hidden"));
    }

    #[test]
    fn any_pattern_may_match() {
        let root = ScanRoot::with_patterns("/var/log", &["*.log", "*.bak"]).unwrap();
        assert!(root.matches("syslog.log"));
        assert!(root.matches("config.bak"));
        assert!(!root.matches("notes.txt"));
    }

    #[test]
    fn prefix_patterns() {
        let root = ScanRoot::new("/x", "thumbcache_*.db").unwrap();
        assert!(root.matches("thumbcache_256.db"));
        assert!(!root.matches("iconcache_256.db"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = ScanRoot::new("/x", "[").unwrap_err();
        assert!(matches!(err, CleanError::Pattern { .. }));
    }

    #[test]
    fn depth_limit_defaults_and_overrides() {
        assert_eq!(ScanRoot::all("/x").depth_limit(), DEFAULT_MAX_DEPTH);
        assert_eq!(ScanRoot::all("/x").max_depth(2).depth_limit(), 2);
        assert_eq!(ScanRoot::all("/x").unbounded().depth_limit(), usize::MAX);
    }

    #[test]
    fn age_predicate_is_either_timestamp() {
        let now = SystemTime::now();
        let cutoff = now - Duration::from_secs(30 * 86_400);
        let old = now - Duration::from_secs(40 * 86_400);
        let young = now - Duration::from_secs(10 * 86_400);

        let mut c = FileCandidate {
            path: PathBuf::from("f"),
            size: 1,
            created: Some(young),
            modified: Some(old),
        };
        assert!(c.is_older_than(cutoff));

        c.created = Some(old);
        c.modified = Some(young);
        assert!(c.is_older_than(cutoff));

        c.created = Some(young);
        assert!(!c.is_older_than(cutoff));

        c.created = None;
        c.modified = None;
        assert!(!c.is_older_than(cutoff));
    }
}
