/// Depth-first producer that runs on the scanner thread.
///
/// Each directory is listed once: matching files are sent immediately,
/// subdirectories are collected and explored after the files. Any error
/// reading a directory skips that directory's subtree and nothing else.
///
/// Only regular files and symlinks are reported. FIFOs, sockets and device
/// nodes are never candidates. Directory links are followed only while their
/// target stays under the canonical root.
use super::visited::VisitedSet;
use super::{FileCandidate, ScanCounters, ScanRoot};
use crate::cancel::CancelToken;
use crossbeam_channel::Sender;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing::{debug, warn};

/// Whether the traversal should keep going after a frame returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Stop,
}

pub(super) struct Walker<'a> {
    pub root: &'a ScanRoot,
    pub tx: Sender<FileCandidate>,
    pub cancel: CancelToken,
    pub counters: &'a ScanCounters,
}

impl Walker<'_> {
    /// Walk the whole root. The root directory itself occupies the first
    /// visited-set frame so a link back to it is caught like any other cycle.
    pub fn run(&self) {
        let root_path = self.root.path();
        let canonical = match fs::canonicalize(root_path) {
            Ok(p) => p,
            Err(err) => {
                warn!("Scan root {} is not accessible: {err}", root_path.display());
                self.counters.dirs_unreadable.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let mut visited = VisitedSet::new();
        if let Some(mut frame) = visited.enter(canonical.clone()) {
            self.walk(root_path, 0, &canonical, &mut frame);
        };
    }

    fn walk(&self, dir: &Path, depth: usize, base: &Path, visited: &mut VisitedSet) -> Flow {
        if self.cancel.is_cancelled() {
            return Flow::Stop;
        }
        self.counters.dirs_visited.fetch_add(1, Ordering::Relaxed);

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Skipping unreadable directory {}: {err}", dir.display());
                self.counters.dirs_unreadable.fetch_add(1, Ordering::Relaxed);
                return Flow::Continue;
            }
        };

        let mut subdirs: Vec<PathBuf> = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    debug!("Skipping unreadable entry in {}: {err}", dir.display());
                    continue;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(err) => {
                    debug!("Cannot stat {}: {err}", path.display());
                    continue;
                }
            };

            if file_type.is_dir() {
                subdirs.push(path);
                continue;
            }

            // Directory links and junctions are explored through the cycle
            // check; file links are reported with the size of the link itself.
            if file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_dir()) {
                subdirs.push(path);
                continue;
            }

            if !file_type.is_file() && !file_type.is_symlink() {
                debug!("Skipping special file {}", path.display());
                continue;
            }

            let name = entry.file_name();
            if !self.root.matches(&name.to_string_lossy()) {
                continue;
            }

            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    debug!("Cannot read metadata for {}: {err}", path.display());
                    continue;
                }
            };

            let candidate = FileCandidate {
                path,
                size: meta.len(),
                created: meta.created().ok(),
                modified: meta.modified().ok(),
            };

            if self.cancel.is_cancelled() {
                return Flow::Stop;
            }
            if self.tx.send(candidate).is_err() {
                // Consumer dropped the sequence.
                return Flow::Stop;
            }
        }

        if depth >= self.root.depth_limit() {
            return Flow::Continue;
        }

        for sub in subdirs {
            if self.cancel.is_cancelled() {
                return Flow::Stop;
            }

            let canonical = match fs::canonicalize(&sub) {
                Ok(p) => p,
                Err(err) => {
                    warn!("Skipping unresolvable directory {}: {err}", sub.display());
                    self.counters.dirs_unreadable.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            };

            if !canonical.starts_with(base) {
                warn!(
                    "Skipping link that leaves the scan root: {} -> {}",
                    sub.display(),
                    canonical.display()
                );
                self.counters.escapes_skipped.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            match visited.enter(canonical) {
                Some(mut frame) => {
                    if self.walk(&sub, depth + 1, base, &mut frame) == Flow::Stop {
                        return Flow::Stop;
                    }
                }
                None => {
                    warn!(
                        "Skipping already visited directory to prevent infinite loop: {}",
                        sub.display()
                    );
                    self.counters.cycles_skipped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        Flow::Continue
    }
}
