/// Orchestrator: runs the selected category cleaners concurrently and
/// aggregates their outcomes.
///
/// Each cleaner gets its own named OS thread inside a [`std::thread::scope`],
/// so every thread is joined before the aggregate is built. A failure, a
/// cancellation or a panic in one cleaner is recorded in that category's
/// [`ServiceResult`] and never affects its siblings.
///
/// Cleaners are constructed per run from the run's options: the reclaim mode
/// and age cutoff are baked in at construction, so nothing is shared between
/// runs except the [`Locations`], the OS commands and the process runner.
use crate::cancel::CancelToken;
use crate::cleaners::{
    AgedFilesCleaner, BrowserDataCleaner, BrowserDataParts, CategoryCleaner, DnsCacheCleaner,
    SystemLogsCleaner, SystemLogsParts, TempFilesCleaner,
};
use crate::error::Result;
use crate::model::{Category, CleaningOptions, CleaningResult, ServiceResult};
use crate::platform::{Locations, SystemCommands};
use crate::process::{ProcessRunner, SystemProcessRunner};
use crate::reclaim::Reclaimer;
use chrono::Local;
use rayon::prelude::*;
use std::any::Any;
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

pub struct Orchestrator {
    locations: Locations,
    commands: SystemCommands,
    runner: Arc<dyn ProcessRunner>,
}

impl Orchestrator {
    pub fn new(
        locations: Locations,
        commands: SystemCommands,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            locations,
            commands,
            runner,
        }
    }

    /// Real locations, real OS commands, real child processes.
    pub fn system() -> Self {
        Self::new(
            Locations::system(),
            SystemCommands::system(),
            Arc::new(SystemProcessRunner),
        )
    }

    /// One cleaner per selected category, in report order.
    pub fn cleaners(&self, options: &CleaningOptions) -> Vec<Box<dyn CategoryCleaner>> {
        let reclaimer = Reclaimer::new(options.reclaim_mode);
        options
            .selected_categories()
            .into_iter()
            .map(|category| -> Box<dyn CategoryCleaner> {
                match category {
                    Category::TemporaryFiles => {
                        Box::new(TempFilesCleaner::new(&self.locations, reclaimer))
                    }
                    Category::SystemLogs => Box::new(SystemLogsCleaner::new(
                        &self.locations,
                        &self.commands,
                        Arc::clone(&self.runner),
                        SystemLogsParts {
                            log_files: options.include_log_files,
                            event_logs: options.include_event_logs,
                        },
                        reclaimer,
                    )),
                    Category::AgedFiles => Box::new(AgedFilesCleaner::new(
                        &self.locations,
                        options.old_files_days,
                        reclaimer,
                    )),
                    Category::BrowserData => Box::new(BrowserDataCleaner::new(
                        &self.locations,
                        BrowserDataParts {
                            history: options.include_browser_history,
                            cookies: options.include_browser_cookies,
                        },
                        reclaimer,
                    )),
                    Category::DnsCache => Box::new(DnsCacheCleaner::new(
                        &self.commands,
                        Arc::clone(&self.runner),
                    )),
                }
            })
            .collect()
    }

    /// Run every category `options` selects and wait for all of them.
    pub fn run(&self, options: &CleaningOptions, cancel: &CancelToken) -> CleaningResult {
        info!(
            "Starting cleaning run: {:?}, {:?} mode",
            options.selected_categories(),
            options.reclaim_mode
        );
        Self::run_cleaners(&self.cleaners(options), cancel)
    }

    /// Run an explicit set of cleaners, one thread each, sharing `cancel`.
    pub fn run_cleaners(cleaners: &[Box<dyn CategoryCleaner>], cancel: &CancelToken) -> CleaningResult {
        let start_time = Local::now();

        let service_results = thread::scope(|scope| {
            let spawned: Vec<_> = cleaners
                .iter()
                .map(|cleaner| {
                    let cleaner = cleaner.as_ref();
                    let handle = thread::Builder::new()
                        .name(format!("disksweep-{}", cleaner.category().slug()))
                        .spawn_scoped(scope, move || run_one(cleaner, cancel));
                    (cleaner.category(), handle)
                })
                .collect();

            spawned
                .into_iter()
                .map(|(category, handle)| match handle {
                    Ok(handle) => handle.join().unwrap_or_else(|payload| {
                        let message = panic_message(payload.as_ref());
                        error!("{category} panicked: {message}");
                        ServiceResult::failed(category, message, start_time, Local::now())
                    }),
                    Err(err) => {
                        error!("Failed to start {category}: {err}");
                        ServiceResult::failed(
                            category,
                            format!("failed to spawn worker thread: {err}"),
                            start_time,
                            Local::now(),
                        )
                    }
                })
                .collect::<Vec<_>>()
        });

        let result = CleaningResult::from_services(start_time, Local::now(), service_results);
        info!(
            "Cleaning run finished in {:.1?}: {} files, {} bytes, success = {}",
            result.duration, result.total_files_processed, result.total_space_freed, result.success
        );
        result
    }

    /// Estimated reclaimable bytes per selected category, computed in
    /// parallel on the rayon pool.
    pub fn estimate(
        &self,
        options: &CleaningOptions,
        cancel: &CancelToken,
    ) -> Result<Vec<(Category, u64)>> {
        self.cleaners(options)
            .par_iter()
            .map(|cleaner| Ok((cleaner.category(), cleaner.estimate_size(cancel)?)))
            .collect()
    }
}

fn run_one(cleaner: &dyn CategoryCleaner, cancel: &CancelToken) -> ServiceResult {
    let category = cleaner.category();
    let start_time = Local::now();
    info!("Starting {}", cleaner.name());

    let outcome = cleaner.execute(cancel);
    let end_time = Local::now();
    match outcome {
        Ok(metrics) => {
            info!(
                "{} finished: {} files, {} bytes, {} skipped",
                cleaner.name(),
                metrics.files_processed,
                metrics.bytes_freed,
                metrics.files_skipped
            );
            ServiceResult::succeeded(category, metrics, start_time, end_time)
        }
        Err(err) => {
            if err.is_cancelled() {
                info!("{} was cancelled", cleaner.name());
            } else {
                error!("{} failed: {err}", cleaner.name());
            }
            ServiceResult::failed(category, err.to_string(), start_time, end_time)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "cleaner panicked".to_string()
    }
}
