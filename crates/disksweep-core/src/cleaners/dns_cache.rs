/// DNS cache: a single external flush command, no files.
use super::CategoryCleaner;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::model::{Category, Metrics};
use crate::platform::{CommandSpec, SystemCommands};
use crate::process::ProcessRunner;
use std::sync::Arc;
use tracing::{info, warn};

pub struct DnsCacheCleaner {
    command: Option<CommandSpec>,
    runner: Arc<dyn ProcessRunner>,
}

impl DnsCacheCleaner {
    pub fn new(commands: &SystemCommands, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            command: commands.dns_flush.clone(),
            runner,
        }
    }
}

impl CategoryCleaner for DnsCacheCleaner {
    fn category(&self) -> Category {
        Category::DnsCache
    }

    fn description(&self) -> &'static str {
        "Flushes the DNS resolver cache"
    }

    /// Flushing a cache frees no disk space.
    fn estimate_size(&self, _cancel: &CancelToken) -> Result<u64> {
        Ok(0)
    }

    fn execute(&self, cancel: &CancelToken) -> Result<Metrics> {
        let Some(command) = &self.command else {
            warn!("No DNS flush command for this platform");
            return Ok(Metrics::default());
        };
        info!("Flushing DNS cache");
        let output = self.runner.run(&command.program, &command.arg_refs(), cancel)?;
        output.log(&command.display());
        Ok(Metrics::default())
    }
}
