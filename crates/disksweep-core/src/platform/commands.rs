/// OS commands used by the DNS-cache and event-log cleaners.
///
/// Only the command lines live here. Running them goes through
/// [`crate::process::ProcessRunner`] so tests can script the results.

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }

    /// `program arg arg ...`, for log messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One way of clearing the OS event logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventLogClear {
    /// A single command clears every log.
    Single(CommandSpec),
    /// `list` prints one log name per line; `clear` is run once per name with
    /// the name appended as its last argument.
    PerLog { list: CommandSpec, clear: CommandSpec },
}

/// Commands the system-level categories invoke.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemCommands {
    pub dns_flush: Option<CommandSpec>,
    /// Tried first.
    pub event_logs_primary: Option<EventLogClear>,
    /// Tried only if the primary fails to run at all.
    pub event_logs_fallback: Option<EventLogClear>,
}

impl SystemCommands {
    #[cfg(windows)]
    pub fn system() -> Self {
        Self {
            dns_flush: Some(CommandSpec::new("ipconfig", &["/flushdns"])),
            event_logs_primary: Some(EventLogClear::Single(CommandSpec::new(
                "powershell",
                &[
                    "-NoProfile",
                    "-NonInteractive",
                    "-Command",
                    "Get-WinEvent -ListLog * | Where-Object {$_.RecordCount -gt 0} \
                     | ForEach-Object { Clear-WinEvent -LogName $_.LogName -Confirm:$false }",
                ],
            ))),
            event_logs_fallback: Some(EventLogClear::PerLog {
                list: CommandSpec::new("wevtutil", &["el"]),
                clear: CommandSpec::new("wevtutil", &["cl"]),
            }),
        }
    }

    #[cfg(target_os = "macos")]
    pub fn system() -> Self {
        Self {
            dns_flush: Some(CommandSpec::new("dscacheutil", &["-flushcache"])),
            event_logs_primary: Some(EventLogClear::Single(CommandSpec::new(
                "log",
                &["erase", "--all"],
            ))),
            event_logs_fallback: None,
        }
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    pub fn system() -> Self {
        Self {
            dns_flush: Some(CommandSpec::new("resolvectl", &["flush-caches"])),
            event_logs_primary: Some(EventLogClear::Single(CommandSpec::new(
                "journalctl",
                &["--rotate", "--vacuum-time=1s"],
            ))),
            event_logs_fallback: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("ipconfig", &["/flushdns"]);
        assert_eq!(spec.display(), "ipconfig /flushdns");
        assert_eq!(spec.arg_refs(), vec!["/flushdns"]);
    }

    #[test]
    fn system_commands_always_include_dns_flush() {
        assert!(SystemCommands::system().dns_flush.is_some());
        assert!(SystemCommands::system().event_logs_primary.is_some());
    }
}
