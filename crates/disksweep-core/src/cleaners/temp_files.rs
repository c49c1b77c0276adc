/// Temporary files: everything under the temp roots, the prefetch cache and
/// the thumbnail caches.
use super::{estimate_scan, reclaim_scan, CategoryCleaner};
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::model::{Category, Metrics};
use crate::platform::{Locations, PatternDir};
use crate::reclaim::Reclaimer;
use crate::scanner::ScanRoot;
use std::path::PathBuf;
use tracing::info;

pub struct TempFilesCleaner {
    dirs: Vec<PathBuf>,
    thumbnail_caches: Vec<PatternDir>,
    reclaimer: Reclaimer,
}

impl TempFilesCleaner {
    pub fn new(locations: &Locations, reclaimer: Reclaimer) -> Self {
        let mut dirs = locations.temp_dirs.clone();
        dirs.extend(locations.prefetch_dir.iter().cloned());
        Self {
            dirs,
            thumbnail_caches: locations.thumbnail_caches.clone(),
            reclaimer,
        }
    }

    fn roots(&self) -> Result<Vec<ScanRoot>> {
        let mut roots: Vec<ScanRoot> = self.dirs.iter().map(ScanRoot::all).collect();
        for cache in &self.thumbnail_caches {
            roots.push(ScanRoot::new(&cache.dir, &cache.pattern)?.max_depth(cache.max_depth));
        }
        Ok(roots)
    }
}

impl CategoryCleaner for TempFilesCleaner {
    fn category(&self) -> Category {
        Category::TemporaryFiles
    }

    fn description(&self) -> &'static str {
        "Removes temporary files from various system locations"
    }

    fn estimate_size(&self, cancel: &CancelToken) -> Result<u64> {
        let mut total = 0;
        for root in self.roots()? {
            total += estimate_scan(&root, cancel, |_| true)?;
        }
        info!("Estimated temporary files size: {total} bytes");
        Ok(total)
    }

    fn execute(&self, cancel: &CancelToken) -> Result<Metrics> {
        info!("Starting temporary files cleaning");
        let mut metrics = Metrics::default();
        for root in self.roots()? {
            cancel.check()?;
            reclaim_scan(&root, &self.reclaimer, cancel, &mut metrics, |_| true)?;
        }
        info!(
            "Finished temporary files cleaning: {} files, {} bytes",
            metrics.files_processed, metrics.bytes_freed
        );
        Ok(metrics)
    }
}
