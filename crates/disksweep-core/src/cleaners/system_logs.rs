/// System logs: log-like files under the system roots, crash dumps, and the
/// OS event logs.
///
/// One cleaner serves two option flags. The file part runs when log files
/// are selected and the event-log part when event logs are selected.
///
/// Event logs are cleared with the primary command; the fallback is tried
/// only when the primary cannot be run at all. Neither failing is fatal to
/// the category: their output is logged and nothing is counted.
use super::{estimate_scan, file_size, reclaim_file, reclaim_scan, CategoryCleaner};
use crate::cancel::CancelToken;
use crate::error::{CleanError, Result};
use crate::model::{Category, Metrics};
use crate::platform::{is_elevated, EventLogClear, Locations, PatternDir, SystemCommands};
use crate::process::ProcessRunner;
use crate::reclaim::Reclaimer;
use crate::scanner::ScanRoot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Which halves of the category are enabled for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemLogsParts {
    pub log_files: bool,
    pub event_logs: bool,
}

pub struct SystemLogsCleaner {
    parts: SystemLogsParts,
    log_roots: Vec<PathBuf>,
    log_patterns: Vec<String>,
    crash_dump_files: Vec<PathBuf>,
    crash_dump_dirs: Vec<PatternDir>,
    primary: Option<EventLogClear>,
    fallback: Option<EventLogClear>,
    runner: Arc<dyn ProcessRunner>,
    reclaimer: Reclaimer,
}

impl SystemLogsCleaner {
    pub fn new(
        locations: &Locations,
        commands: &SystemCommands,
        runner: Arc<dyn ProcessRunner>,
        parts: SystemLogsParts,
        reclaimer: Reclaimer,
    ) -> Self {
        Self {
            parts,
            log_roots: locations.log_roots.clone(),
            log_patterns: locations.log_patterns.clone(),
            crash_dump_files: locations.crash_dump_files.clone(),
            crash_dump_dirs: locations.crash_dump_dirs.clone(),
            primary: commands.event_logs_primary.clone(),
            fallback: commands.event_logs_fallback.clone(),
            runner,
            reclaimer,
        }
    }

    fn log_scan_roots(&self) -> Result<Vec<ScanRoot>> {
        let patterns: Vec<&str> = self.log_patterns.iter().map(String::as_str).collect();
        let mut roots = self
            .log_roots
            .iter()
            .map(|root| ScanRoot::with_patterns(root, &patterns))
            .collect::<Result<Vec<_>>>()?;
        for dumps in &self.crash_dump_dirs {
            roots.push(ScanRoot::new(&dumps.dir, &dumps.pattern)?.max_depth(dumps.max_depth));
        }
        Ok(roots)
    }

    fn clean_log_files(&self, cancel: &CancelToken, metrics: &mut Metrics) -> Result<()> {
        for root in self.log_scan_roots()? {
            cancel.check()?;
            reclaim_scan(&root, &self.reclaimer, cancel, metrics, |_| true)?;
        }
        for dump in &self.crash_dump_files {
            cancel.check()?;
            reclaim_file(dump, &self.reclaimer, metrics);
        }
        Ok(())
    }

    fn clear_event_logs(&self, cancel: &CancelToken) -> Result<()> {
        let Some(primary) = &self.primary else {
            debug!("No event-log command for this platform");
            return Ok(());
        };
        info!("Clearing event logs");

        let err = match self.run_clear(primary, cancel) {
            Ok(()) => return Ok(()),
            Err(CleanError::Cancelled) => return Err(CleanError::Cancelled),
            Err(err) => err,
        };
        error!("Error clearing event logs: {err}");

        let Some(fallback) = &self.fallback else {
            return Ok(());
        };
        match self.run_clear(fallback, cancel) {
            Err(CleanError::Cancelled) => Err(CleanError::Cancelled),
            Err(err) => {
                error!("Error in fallback event-log clearing: {err}");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    fn run_clear(&self, method: &EventLogClear, cancel: &CancelToken) -> Result<()> {
        match method {
            EventLogClear::Single(command) => {
                self.runner
                    .run(&command.program, &command.arg_refs(), cancel)?
                    .log(&command.display());
            }
            EventLogClear::PerLog { list, clear } => {
                let listing = self.runner.run(&list.program, &list.arg_refs(), cancel)?;
                for name in listing.stdout.lines().map(str::trim).filter(|n| !n.is_empty()) {
                    cancel.check()?;
                    let mut args = clear.arg_refs();
                    args.push(name);
                    match self.runner.run(&clear.program, &args, cancel) {
                        Ok(out) if out.success() => debug!("Cleared event log {name}"),
                        Ok(out) => warn!(
                            "Clearing event log {name} exited with {:?}: {}",
                            out.exit_code,
                            out.stderr.trim()
                        ),
                        Err(CleanError::Cancelled) => return Err(CleanError::Cancelled),
                        Err(err) => error!("Failed to clear event log {name}: {err}"),
                    }
                }
            }
        }
        Ok(())
    }
}

impl CategoryCleaner for SystemLogsCleaner {
    fn category(&self) -> Category {
        Category::SystemLogs
    }

    fn description(&self) -> &'static str {
        "Removes system log files, crash dumps and event logs"
    }

    fn estimate_size(&self, cancel: &CancelToken) -> Result<u64> {
        if !self.parts.log_files {
            return Ok(0);
        }
        let mut total = 0;
        for root in self.log_scan_roots()? {
            total += estimate_scan(&root, cancel, |_| true)?;
        }
        total += self.crash_dump_files.iter().map(|p| file_size(p)).sum::<u64>();
        info!("Estimated system logs size: {total} bytes");
        Ok(total)
    }

    fn execute(&self, cancel: &CancelToken) -> Result<Metrics> {
        info!("Starting system logs cleaning");
        if !is_elevated() {
            warn!("Not running elevated; most system logs will be skipped");
        }

        let mut metrics = Metrics::default();
        if self.parts.log_files {
            self.clean_log_files(cancel, &mut metrics)?;
        }
        if self.parts.event_logs {
            self.clear_event_logs(cancel)?;
        }
        info!(
            "Finished system logs cleaning: {} files, {} bytes",
            metrics.files_processed, metrics.bytes_freed
        );
        Ok(metrics)
    }
}
