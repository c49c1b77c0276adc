//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use disksweep_core::error::{CleanError, Result};
use disksweep_core::platform::{CommandSpec, EventLogClear, Locations, SystemCommands};
use disksweep_core::process::{ProcessOutput, ProcessRunner};
use disksweep_core::{CancelToken, Orchestrator};
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

pub fn write_bytes(path: &Path, n: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![0u8; n]).unwrap();
}

/// Create a named pipe at `path` with the system `mkfifo`.
#[cfg(unix)]
pub fn make_fifo(path: &Path) {
    let status = std::process::Command::new("mkfifo").arg(path).status().unwrap();
    assert!(status.success(), "mkfifo {}", path.display());
}

/// Process runner that records every call and answers from a closure.
pub struct FakeRunner {
    respond: Box<dyn Fn(&str, &[&str]) -> Result<ProcessOutput> + Send + Sync>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new(
        respond: impl Fn(&str, &[&str]) -> Result<ProcessOutput> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Every program exits 0 with no output.
    pub fn succeeding() -> Arc<Self> {
        Self::new(|_, _| Ok(ok_output("")))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str], cancel: &CancelToken) -> Result<ProcessOutput> {
        cancel.check()?;
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.lock().push(line);
        (self.respond)(program, args)
    }
}

pub fn ok_output(stdout: &str) -> ProcessOutput {
    ProcessOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn not_found(program: &str) -> CleanError {
    CleanError::ProcessStart {
        program: program.to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
    }
}

/// Commands with made-up program names so a call log is easy to assert on.
pub fn fake_commands() -> SystemCommands {
    SystemCommands {
        dns_flush: Some(CommandSpec::new("flush-dns", &[])),
        event_logs_primary: Some(EventLogClear::Single(CommandSpec::new(
            "clear-all-logs",
            &["--yes"],
        ))),
        event_logs_fallback: Some(EventLogClear::PerLog {
            list: CommandSpec::new("list-logs", &[]),
            clear: CommandSpec::new("clear-log", &[]),
        }),
    }
}

pub fn orchestrator(locations: Locations, runner: Arc<FakeRunner>) -> Orchestrator {
    Orchestrator::new(locations, fake_commands(), runner)
}
