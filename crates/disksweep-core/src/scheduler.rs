/// Scheduler: fires the orchestrator on a fixed interval.
///
/// At most one schedule is active. It owns one background timer thread that
/// waits on a stop channel with `recv_timeout`: a timeout fires a run, and a
/// disconnected channel (the sender was dropped by [`Scheduler::cancel_schedule`]
/// or by a re-schedule) ends the thread. A run already in progress is allowed
/// to finish.
///
/// Each fire uses a fresh, never-cancelled token. Failures and panics are
/// logged and the schedule keeps firing.
use crate::cancel::CancelToken;
use crate::error::{CleanError, Result};
use crate::model::{CleaningOptions, CleaningResult};
use crate::orchestrator::Orchestrator;
use crossbeam_channel::{RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

const SECONDS_PER_HOUR: u64 = 3_600;

struct ActiveSchedule {
    /// Dropping this stops the timer thread.
    _stop_tx: Sender<()>,
    interval: Duration,
}

#[derive(Default)]
struct Outcomes {
    last_result: Mutex<Option<CleaningResult>>,
    runs_completed: AtomicU64,
}

pub struct Scheduler {
    orchestrator: Arc<Orchestrator>,
    active: Mutex<Option<ActiveSchedule>>,
    outcomes: Arc<Outcomes>,
}

impl Scheduler {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            active: Mutex::new(None),
            outcomes: Arc::new(Outcomes::default()),
        }
    }

    /// Run `options` every `hours` hours, replacing any existing schedule.
    pub fn schedule(&self, options: CleaningOptions, hours: u32) -> Result<()> {
        self.schedule_every(
            options,
            Duration::from_secs(u64::from(hours) * SECONDS_PER_HOUR),
        )
    }

    /// Run `options` every `interval`, replacing any existing schedule.
    pub fn schedule_every(&self, options: CleaningOptions, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(CleanError::InvalidInterval);
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let orchestrator = Arc::clone(&self.orchestrator);
        let outcomes = Arc::clone(&self.outcomes);

        thread::Builder::new()
            .name("disksweep-scheduler".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => fire(&orchestrator, &options, &outcomes),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| CleanError::Thread(format!("failed to spawn scheduler thread: {e}")))?;

        let previous = self.active.lock().replace(ActiveSchedule {
            _stop_tx: stop_tx,
            interval,
        });
        if previous.is_some() {
            info!("Replaced existing cleanup schedule");
        }
        info!("Scheduled cleanup every {interval:?}");
        Ok(())
    }

    /// Stop the active schedule, if any. A run already in progress completes.
    pub fn cancel_schedule(&self) {
        if self.active.lock().take().is_some() {
            info!("Scheduled cleanup cancelled");
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.active.lock().is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.active.lock().as_ref().map(|a| a.interval)
    }

    /// Result of the most recent completed fire.
    pub fn last_result(&self) -> Option<CleaningResult> {
        self.outcomes.last_result.lock().clone()
    }

    /// Number of fires that completed without panicking.
    pub fn runs_completed(&self) -> u64 {
        self.outcomes.runs_completed.load(Ordering::Relaxed)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_schedule();
    }
}

fn fire(orchestrator: &Orchestrator, options: &CleaningOptions, outcomes: &Outcomes) {
    info!("Starting scheduled cleanup");
    let run = panic::catch_unwind(AssertUnwindSafe(|| {
        orchestrator.run(options, &CancelToken::new())
    }));
    match run {
        Ok(result) => {
            if result.success {
                info!("Scheduled cleanup completed");
            } else {
                warn!("Scheduled cleanup completed with failed categories");
            }
            *outcomes.last_result.lock() = Some(result);
            outcomes.runs_completed.fetch_add(1, Ordering::Relaxed);
        }
        Err(_) => error!("Error in scheduled cleanup: run panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Locations, SystemCommands};
    use crate::process::SystemProcessRunner;

    fn scheduler() -> Scheduler {
        Scheduler::new(Arc::new(Orchestrator::new(
            Locations::default(),
            SystemCommands::default(),
            Arc::new(SystemProcessRunner),
        )))
    }

    #[test]
    fn zero_interval_is_rejected() {
        let s = scheduler();
        let err = s.schedule(CleaningOptions::none(), 0).unwrap_err();
        assert!(matches!(err, CleanError::InvalidInterval));
        assert!(!s.is_scheduled());
    }

    #[test]
    fn schedule_then_cancel() {
        let s = scheduler();
        s.schedule(CleaningOptions::none(), 24).unwrap();
        assert!(s.is_scheduled());
        assert_eq!(s.interval(), Some(Duration::from_secs(24 * 3_600)));

        s.cancel_schedule();
        assert!(!s.is_scheduled());
        assert_eq!(s.interval(), None);
        s.cancel_schedule();
    }

    #[test]
    fn reschedule_replaces_the_interval() {
        let s = scheduler();
        s.schedule(CleaningOptions::none(), 1).unwrap();
        s.schedule(CleaningOptions::none(), 2).unwrap();
        assert_eq!(s.interval(), Some(Duration::from_secs(2 * 3_600)));
    }
}
