/// Error type for category-level and collaborator failures.
///
/// Per-file problems (vanished, locked, access denied) are never errors; they
/// are reported through [`crate::reclaim::ReclaimOutcome`] and logged. Only
/// conditions that fail a whole category, or a collaborator call, surface here.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanError {
    /// The shared cancellation token was triggered.
    #[error("Operation was cancelled")]
    Cancelled,

    /// An external program could not be started at all.
    #[error("failed to start `{program}`: {source}")]
    ProcessStart {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid file pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("schedule interval must be greater than zero")]
    InvalidInterval,

    #[error("settings error: {0}")]
    Settings(String),

    #[error("report error: {0}")]
    Report(String),

    /// A worker thread could not be spawned or terminated abnormally.
    #[error("worker thread failed: {0}")]
    Thread(String),
}

impl CleanError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = CleanError> = std::result::Result<T, E>;
