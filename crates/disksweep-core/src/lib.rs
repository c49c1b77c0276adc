/// DiskSweep Core: scanning, reclamation and orchestration.
///
/// This crate contains all cleaning logic with zero UI dependencies.
/// The `disksweep` binary is a thin command-line front end over it.
///
/// # Modules
///
/// - [`scanner`]: Cycle-safe, depth-bounded, cancellable file enumeration.
/// - [`reclaim`]: In-use detection and trash-or-delete of single files.
/// - [`cleaners`]: The five category cleaners behind one trait.
/// - [`orchestrator`]: Concurrent execution and result aggregation.
/// - [`scheduler`]: Fixed-interval repeated runs.
/// - [`platform`]: Well-known locations, OS commands, elevation check.
/// - [`process`]: External process runner used for OS commands.
/// - [`settings`] / [`report`]: Persisted preferences and result rendering.
/// - [`model`]: Options, results and formatting helpers.
pub mod cancel;
pub mod cleaners;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod platform;
pub mod process;
pub mod reclaim;
pub mod report;
pub mod scanner;
pub mod scheduler;
pub mod settings;

pub use cancel::CancelToken;
pub use error::{CleanError, Result};
pub use orchestrator::Orchestrator;
pub use scheduler::Scheduler;
