/// Cooperative cancellation shared by every unit of work in a cleaning run.
///
/// A single token is cloned into the orchestrator, each category cleaner, each
/// scanner producer thread and each external-process poll loop. Cancelling any
/// clone is observed by all of them at their next check.
use crate::error::CleanError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cheap-to-clone cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// `Err(CleanError::Cancelled)` once cancellation has been requested.
    #[inline]
    pub fn check(&self) -> Result<(), CleanError> {
        if self.is_cancelled() {
            Err(CleanError::Cancelled)
        } else {
            Ok(())
        }
    }
}
