/// Platform-specific functionality: well-known cleanup locations, the OS
/// commands for DNS and event logs, and the elevation check.

pub mod commands;
pub mod locations;
pub mod permissions;

pub use commands::{CommandSpec, EventLogClear, SystemCommands};
pub use locations::{BrowserStore, Locations, PatternDir, ProfileLayout, LOG_PATTERNS};
pub use permissions::is_elevated;
