/// Aged files: anything under the temp roots older than a cutoff.
///
/// A file qualifies when either its creation time or its last-write time is
/// before `now - days`. The cutoff is computed at the start of every call.
use super::{estimate_scan, reclaim_scan, CategoryCleaner};
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::model::{Category, Metrics};
use crate::platform::Locations;
use crate::reclaim::Reclaimer;
use crate::scanner::ScanRoot;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::info;

const SECONDS_PER_DAY: u64 = 86_400;

pub struct AgedFilesCleaner {
    dirs: Vec<PathBuf>,
    days: u32,
    reclaimer: Reclaimer,
}

impl AgedFilesCleaner {
    pub fn new(locations: &Locations, days: u32, reclaimer: Reclaimer) -> Self {
        Self {
            dirs: locations.temp_dirs.clone(),
            days,
            reclaimer,
        }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    fn cutoff(&self) -> SystemTime {
        let age = Duration::from_secs(u64::from(self.days) * SECONDS_PER_DAY);
        SystemTime::now()
            .checked_sub(age)
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }
}

impl CategoryCleaner for AgedFilesCleaner {
    fn category(&self) -> Category {
        Category::AgedFiles
    }

    fn description(&self) -> &'static str {
        "Removes old files based on creation date"
    }

    fn estimate_size(&self, cancel: &CancelToken) -> Result<u64> {
        let cutoff = self.cutoff();
        let mut total = 0;
        for dir in &self.dirs {
            total += estimate_scan(&ScanRoot::all(dir), cancel, |c| c.is_older_than(cutoff))?;
        }
        info!("Estimated size of files older than {} days: {total} bytes", self.days);
        Ok(total)
    }

    fn execute(&self, cancel: &CancelToken) -> Result<Metrics> {
        info!("Starting old files cleaning (older than {} days)", self.days);
        let cutoff = self.cutoff();
        let mut metrics = Metrics::default();
        for dir in &self.dirs {
            cancel.check()?;
            reclaim_scan(
                &ScanRoot::all(dir),
                &self.reclaimer,
                cancel,
                &mut metrics,
                |c| c.is_older_than(cutoff),
            )?;
        }
        info!(
            "Finished old files cleaning: {} files, {} bytes",
            metrics.files_processed, metrics.bytes_freed
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReclaimMode;

    #[test]
    fn cutoff_moves_back_by_whole_days() {
        let cleaner = AgedFilesCleaner::new(
            &Locations::default(),
            30,
            Reclaimer::new(ReclaimMode::Permanent),
        );
        let expected = Duration::from_secs(30 * SECONDS_PER_DAY);
        let before = SystemTime::now();
        let cutoff = cleaner.cutoff();
        let after = SystemTime::now();
        assert!(cutoff >= before - expected);
        assert!(cutoff <= after - expected);
    }

    #[test]
    fn zero_days_means_anything_already_written() {
        let cleaner = AgedFilesCleaner::new(
            &Locations::default(),
            0,
            Reclaimer::new(ReclaimMode::Permanent),
        );
        assert!(cleaner.cutoff() <= SystemTime::now());
        assert_eq!(cleaner.days(), 0);
    }
}
