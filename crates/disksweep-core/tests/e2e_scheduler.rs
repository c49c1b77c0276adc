/// Scheduler firing against a real temporary directory.
mod common;

use common::{orchestrator, write_bytes, FakeRunner};
use disksweep_core::model::{Category, CleaningOptions, ReclaimMode};
use disksweep_core::platform::Locations;
use disksweep_core::Scheduler;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let until = Instant::now() + deadline;
    while Instant::now() < until {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    done()
}

#[test]
fn schedule_fires_repeatedly_until_cancelled() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_bytes(&tmp.path().join("a.tmp"), 100);
    write_bytes(&tmp.path().join("b.tmp"), 200);

    let orchestrator = orchestrator(
        Locations::with_temp_dirs([tmp.path().to_path_buf()]),
        FakeRunner::succeeding(),
    );
    let scheduler = Scheduler::new(Arc::new(orchestrator));
    let mut options = CleaningOptions::only(&[Category::TemporaryFiles]);
    options.reclaim_mode = ReclaimMode::Permanent;

    scheduler
        .schedule_every(options, Duration::from_millis(50))
        .unwrap();
    assert!(scheduler.is_scheduled());

    assert!(
        wait_until(Duration::from_secs(30), || scheduler.runs_completed() >= 2),
        "scheduler did not fire twice within 30 seconds"
    );
    assert!(!tmp.path().join("a.tmp").exists());
    assert!(scheduler.last_result().unwrap().success);

    scheduler.cancel_schedule();
    assert!(!scheduler.is_scheduled());

    // Let any fire that was already running finish, then expect silence.
    thread::sleep(Duration::from_millis(300));
    let settled = scheduler.runs_completed();
    thread::sleep(Duration::from_millis(300));
    assert_eq!(scheduler.runs_completed(), settled);
}

#[test]
fn nothing_fires_before_the_first_interval() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_bytes(&tmp.path().join("a.tmp"), 100);

    let scheduler = Scheduler::new(Arc::new(orchestrator(
        Locations::with_temp_dirs([tmp.path().to_path_buf()]),
        FakeRunner::succeeding(),
    )));
    let mut options = CleaningOptions::only(&[Category::TemporaryFiles]);
    options.reclaim_mode = ReclaimMode::Permanent;
    scheduler.schedule(options, 24).unwrap();

    thread::sleep(Duration::from_millis(200));
    assert_eq!(scheduler.runs_completed(), 0);
    assert!(scheduler.last_result().is_none());
    assert!(tmp.path().join("a.tmp").exists());
}
