/// External process collaborator: runs OS commands (DNS flush, event-log
/// clearing) to completion and captures their output.
///
/// The trait is the seam the cleaners depend on; [`SystemProcessRunner`] is
/// the real implementation and tests substitute a scripted fake.
use crate::cancel::CancelToken;
use crate::error::{CleanError, Result};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// How often a running child is polled for exit and for cancellation.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Log output the way every caller wants it: stdout at info, stderr and
    /// non-zero exit as warnings. Nothing here is treated as a failure.
    pub fn log(&self, command: &str) {
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            info!("Command `{command}` output: {stdout}");
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            warn!("Command `{command}` error output: {stderr}");
        }
        match self.exit_code {
            Some(0) => info!("Command `{command}` completed with exit code 0"),
            Some(code) => warn!("Command `{command}` completed with exit code {code}"),
            None => warn!("Command `{command}` was terminated without an exit code"),
        }
    }
}

/// Runs a program to completion.
///
/// Failing to start the program is an error ([`CleanError::ProcessStart`]);
/// a non-zero exit is not. Implementations must honour `cancel` while the
/// program runs and return [`CleanError::Cancelled`] if it fires.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], cancel: &CancelToken) -> Result<ProcessOutput>;
}

/// Spawns real child processes with piped, captured output and no console
/// window.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str], cancel: &CancelToken) -> Result<ProcessOutput> {
        cancel.check()?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = command.spawn().map_err(|source| CleanError::ProcessStart {
            program: program.to_string(),
            source,
        })?;

        // Drain both pipes concurrently so a chatty child cannot block on a
        // full pipe while we poll for its exit.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CleanError::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => return Err(CleanError::io(program, err)),
            }
        };

        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    let mut pipe = pipe?;
    thread::Builder::new()
        .name("disksweep-pipe".into())
        .spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
        .ok()
}

fn collect(reader: Option<thread::JoinHandle<String>>) -> String {
    reader.and_then(|h| h.join().ok()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_fails_to_start() {
        let err = SystemProcessRunner
            .run(
                "disksweep-definitely-not-a-real-program",
                &[],
                &CancelToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, CleanError::ProcessStart { .. }), "{err}");
    }

    #[test]
    fn pre_cancelled_token_never_spawns() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = SystemProcessRunner
            .run("disksweep-definitely-not-a-real-program", &[], &cancel)
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_stderr_and_exit_code() {
        let out = SystemProcessRunner
            .run(
                "sh",
                &["-c", "echo hello; echo oops >&2; exit 3"],
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn cancellation_kills_a_running_child() {
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let killer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = SystemProcessRunner
            .run("sleep", &["30"], &cancel)
            .unwrap_err();
        killer.join().unwrap();

        assert!(err.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
