/// Data model for DiskSweep: run options, per-category and aggregate results,
/// and size formatting.
pub mod options;
pub mod result;
pub mod size;

pub use options::{Category, CleaningOptions, ReclaimMode, DEFAULT_OLD_FILES_DAYS};
pub use result::{CleaningResult, Metrics, ServiceResult};
