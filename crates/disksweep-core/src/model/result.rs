/// Per-category and aggregate outcomes of a cleaning run.
///
/// Both types are built while the run is in flight and handed to the caller
/// (report renderer, CLI) once the orchestrator returns. Nothing mutates them
/// afterwards.
use crate::model::Category;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters accumulated by one category execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub files_processed: u64,
    pub bytes_freed: u64,
    /// Files that were found but left in place (locked, vanished, failed).
    pub files_skipped: u64,
}

impl Metrics {
    #[inline]
    pub fn record_reclaimed(&mut self, bytes: u64) {
        self.files_processed += 1;
        self.bytes_freed += bytes;
    }

    #[inline]
    pub fn record_skipped(&mut self) {
        self.files_skipped += 1;
    }
}

/// Outcome of one category in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResult {
    pub category: Category,
    pub service_name: String,
    pub success: bool,
    pub files_processed: u64,
    pub bytes_freed: u64,
    pub error_message: Option<String>,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
}

impl ServiceResult {
    pub fn succeeded(
        category: Category,
        metrics: Metrics,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
    ) -> Self {
        Self {
            category,
            service_name: category.label().to_string(),
            success: true,
            files_processed: metrics.files_processed,
            bytes_freed: metrics.bytes_freed,
            error_message: None,
            start_time,
            end_time,
        }
    }

    /// A failed or cancelled category reports no files and no bytes.
    pub fn failed(
        category: Category,
        message: impl Into<String>,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
    ) -> Self {
        Self {
            category,
            service_name: category.label().to_string(),
            success: false,
            files_processed: 0,
            bytes_freed: 0,
            error_message: Some(message.into()),
            start_time,
            end_time,
        }
    }
}

/// Aggregate outcome of one orchestrated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningResult {
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub duration: Duration,
    pub success: bool,
    pub total_files_processed: u64,
    pub total_space_freed: u64,
    pub service_results: Vec<ServiceResult>,
}

impl CleaningResult {
    /// Assemble the aggregate from finished per-category results.
    ///
    /// Totals are plain sums; `success` holds iff every category succeeded
    /// (vacuously true for an empty run).
    pub fn from_services(
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
        mut service_results: Vec<ServiceResult>,
    ) -> Self {
        service_results.sort_by_key(|r| r.category);
        let total_files_processed = service_results.iter().map(|r| r.files_processed).sum();
        let total_space_freed = service_results.iter().map(|r| r.bytes_freed).sum();
        let success = service_results.iter().all(|r| r.success);
        let duration = (end_time - start_time).to_std().unwrap_or_default();

        Self {
            start_time,
            end_time,
            duration,
            success,
            total_files_processed,
            total_space_freed,
            service_results,
        }
    }

    pub fn service(&self, category: Category) -> Option<&ServiceResult> {
        self.service_results.iter().find(|r| r.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(files: u64, bytes: u64) -> Metrics {
        Metrics {
            files_processed: files,
            bytes_freed: bytes,
            files_skipped: 0,
        }
    }

    #[test]
    fn totals_are_sums_of_services() {
        let now = Local::now();
        let result = CleaningResult::from_services(
            now,
            now,
            vec![
                ServiceResult::succeeded(Category::AgedFiles, metrics(2, 50), now, now),
                ServiceResult::succeeded(Category::TemporaryFiles, metrics(3, 600), now, now),
            ],
        );
        assert_eq!(result.total_files_processed, 5);
        assert_eq!(result.total_space_freed, 650);
        assert!(result.success);
        assert_eq!(result.service_results[0].category, Category::TemporaryFiles);
    }

    #[test]
    fn one_failure_fails_the_aggregate() {
        let now = Local::now();
        let result = CleaningResult::from_services(
            now,
            now,
            vec![
                ServiceResult::succeeded(Category::TemporaryFiles, metrics(1, 10), now, now),
                ServiceResult::failed(Category::DnsCache, "Operation was cancelled", now, now),
            ],
        );
        assert!(!result.success);
        assert_eq!(result.total_files_processed, 1);
        let dns = result.service(Category::DnsCache).unwrap();
        assert_eq!(dns.bytes_freed, 0);
        assert_eq!(dns.error_message.as_deref(), Some("Operation was cancelled"));
    }

    #[test]
    fn empty_run_is_successful() {
        let now = Local::now();
        let result = CleaningResult::from_services(now, now, Vec::new());
        assert!(result.success);
        assert_eq!(result.total_space_freed, 0);
    }
}
