/// Safe reclamation primitive: in-use detection plus trash-or-delete.
///
/// Every removal re-checks existence and in-use state immediately before
/// acting. Scans and removals race with the rest of the system (and with
/// other categories of the same run), so a file that vanished or became
/// locked since it was found is an expected outcome, not an error.
///
/// # In-use detection
///
/// - **Windows:** open for read with share mode `0`. A sharing or lock
///   violation means another handle is open.
/// - **Unix:** open for read and take a non-blocking exclusive advisory lock.
///   `WouldBlock` means another descriptor holds a lock.
///
/// Any other failure is treated as "in use": a file whose state cannot be
/// determined is left alone.
use crate::model::ReclaimMode;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Per-file result of a reclamation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReclaimOutcome {
    /// Removed from its location; `bytes` is the size captured just before.
    Reclaimed { bytes: u64 },
    /// Already gone (vanished, or reclaimed by another category first).
    Missing,
    /// Held open or locked by another process.
    InUse,
    /// Present and free but the removal itself failed.
    Failed(String),
}

impl ReclaimOutcome {
    pub fn is_reclaimed(&self) -> bool {
        matches!(self, Self::Reclaimed { .. })
    }

    /// Bytes freed, zero unless reclaimed.
    pub fn bytes(&self) -> u64 {
        match self {
            Self::Reclaimed { bytes } => *bytes,
            _ => 0,
        }
    }
}

/// Removes files in the mode it was built with. The mode comes from the run's
/// options; the reclaimer never picks one itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reclaimer {
    mode: ReclaimMode,
}

impl Reclaimer {
    pub fn new(mode: ReclaimMode) -> Self {
        Self { mode }
    }

    /// Reclaim `path` in the configured mode.
    pub fn reclaim(&self, path: &Path) -> ReclaimOutcome {
        self.reclaim_with(path, self.mode)
    }

    /// Move to the OS trash if the file still exists and is free.
    pub fn move_to_trash(&self, path: &Path) -> bool {
        self.reclaim_with(path, ReclaimMode::Trash).is_reclaimed()
    }

    /// Delete outright if the file still exists and is free.
    pub fn delete_permanently(&self, path: &Path) -> bool {
        self.reclaim_with(path, ReclaimMode::Permanent).is_reclaimed()
    }

    fn reclaim_with(&self, path: &Path, mode: ReclaimMode) -> ReclaimOutcome {
        let meta = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return ReclaimOutcome::Missing,
            Err(err) => {
                warn!("Cannot stat {}: {err}", path.display());
                return ReclaimOutcome::Failed(err.to_string());
            }
        };
        if meta.is_dir() {
            return ReclaimOutcome::Failed("not a file".to_string());
        }
        // Opening a FIFO for the in-use check would block.
        if !meta.is_file() && !meta.is_symlink() {
            return ReclaimOutcome::Failed("not a regular file".to_string());
        }

        // A link cannot be held open; only its target can.
        if !meta.is_symlink() && is_in_use(path) {
            warn!("File is in use, skipping: {}", path.display());
            return ReclaimOutcome::InUse;
        }

        let bytes = meta.len();
        let removed = match mode {
            ReclaimMode::Trash => trash::delete(path).map_err(|e| e.to_string()),
            ReclaimMode::Permanent => fs::remove_file(path).map_err(|e| e.to_string()),
        };

        match removed {
            Ok(()) => {
                debug!(
                    "Reclaimed {} ({bytes} bytes, {})",
                    path.display(),
                    match mode {
                        ReclaimMode::Trash => "moved to trash",
                        ReclaimMode::Permanent => "deleted",
                    }
                );
                ReclaimOutcome::Reclaimed { bytes }
            }
            Err(_) if fs::symlink_metadata(path).is_err() => ReclaimOutcome::Missing,
            Err(reason) => {
                warn!("Failed to reclaim {}: {reason}", path.display());
                ReclaimOutcome::Failed(reason)
            }
        }
    }
}

/// Whether another process holds `path` open exclusively or locked.
pub fn is_in_use(path: &Path) -> bool {
    probe_exclusive(path)
}

#[cfg(windows)]
fn probe_exclusive(path: &Path) -> bool {
    use std::os::windows::fs::OpenOptionsExt;

    const ERROR_SHARING_VIOLATION: i32 = 32;
    const ERROR_LOCK_VIOLATION: i32 = 33;

    match fs::OpenOptions::new().read(true).share_mode(0).open(path) {
        Ok(_file) => false,
        Err(err) => {
            match err.raw_os_error() {
                Some(ERROR_SHARING_VIOLATION) | Some(ERROR_LOCK_VIOLATION) => {}
                _ => debug!(
                    "Treating {} as in use after open failure: {err}",
                    path.display()
                ),
            }
            true
        }
    }
}

#[cfg(not(windows))]
fn probe_exclusive(path: &Path) -> bool {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(err) => {
            debug!("Treating {} as in use after open failure: {err}", path.display());
            return true;
        }
    };
    match file.try_lock() {
        // The lock is released when `file` drops.
        Ok(()) => false,
        Err(fs::TryLockError::WouldBlock) => true,
        Err(fs::TryLockError::Error(err)) => {
            debug!("Treating {} as in use after lock failure: {err}", path.display());
            true
        }
    }
}
