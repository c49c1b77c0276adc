/// Browser data: history and cookie databases of the known browsers.
///
/// Targets are fixed file names inside each profile directory; nothing is
/// scanned recursively. A browser that is running keeps these files locked,
/// so they are skipped rather than corrupted.
use super::{file_size, reclaim_file, CategoryCleaner};
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::model::{Category, Metrics};
use crate::platform::{BrowserStore, Locations, ProfileLayout};
use crate::reclaim::Reclaimer;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Which stores are targeted for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserDataParts {
    pub history: bool,
    pub cookies: bool,
}

pub struct BrowserDataCleaner {
    parts: BrowserDataParts,
    browsers: Vec<BrowserStore>,
    reclaimer: Reclaimer,
}

impl BrowserDataCleaner {
    pub fn new(locations: &Locations, parts: BrowserDataParts, reclaimer: Reclaimer) -> Self {
        Self {
            parts,
            browsers: locations.browsers.clone(),
            reclaimer,
        }
    }

    /// Every history/cookie file path for the enabled parts, present or not.
    fn targets(&self, cancel: &CancelToken) -> Result<Vec<(&str, PathBuf)>> {
        let mut targets = Vec::new();
        for browser in &self.browsers {
            cancel.check()?;
            for profile in profiles(browser) {
                if self.parts.history {
                    targets.extend(
                        browser
                            .history_files
                            .iter()
                            .map(|f| (browser.vendor.as_str(), profile.join(f))),
                    );
                }
                if self.parts.cookies {
                    targets.extend(
                        browser
                            .cookie_files
                            .iter()
                            .map(|f| (browser.vendor.as_str(), profile.join(f))),
                    );
                }
            }
        }
        Ok(targets)
    }
}

fn profiles(browser: &BrowserStore) -> Vec<PathBuf> {
    match &browser.layout {
        ProfileLayout::Single(dir) if dir.is_dir() => vec![dir.clone()],
        ProfileLayout::Single(_) => Vec::new(),
        ProfileLayout::ProfilesRoot(root) => match fs::read_dir(root) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect(),
            Err(err) => {
                debug!("No {} profiles under {}: {err}", browser.vendor, root.display());
                Vec::new()
            }
        },
    }
}

impl CategoryCleaner for BrowserDataCleaner {
    fn category(&self) -> Category {
        Category::BrowserData
    }

    fn description(&self) -> &'static str {
        "Removes browser history and cookies"
    }

    fn estimate_size(&self, cancel: &CancelToken) -> Result<u64> {
        let total = self
            .targets(cancel)?
            .iter()
            .map(|(_, path)| file_size(path))
            .sum();
        info!("Estimated browser data size: {total} bytes");
        Ok(total)
    }

    fn execute(&self, cancel: &CancelToken) -> Result<Metrics> {
        info!("Starting browser data cleaning");
        let mut metrics = Metrics::default();
        for (vendor, path) in self.targets(cancel)? {
            cancel.check()?;
            let before = metrics.files_skipped;
            reclaim_file(&path, &self.reclaimer, &mut metrics);
            if metrics.files_skipped > before {
                warn!("{vendor} data left in place (is the browser running?): {}", path.display());
            }
        }
        info!(
            "Finished browser data cleaning: {} files, {} bytes",
            metrics.files_processed, metrics.bytes_freed
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReclaimMode;
    use std::path::Path;
    use tempfile::TempDir;

    fn store(layout: ProfileLayout) -> BrowserStore {
        BrowserStore {
            vendor: "Firefox".into(),
            layout,
            history_files: vec![PathBuf::from("places.sqlite")],
            cookie_files: vec![PathBuf::from("cookies.sqlite")],
        }
    }

    fn write(dir: &Path, name: &str, n: usize) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), vec![0u8; n]).unwrap();
    }

    #[test]
    fn every_profile_under_a_profiles_root_is_visited() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("abc.default"), "places.sqlite", 10);
        write(&tmp.path().join("xyz.dev"), "places.sqlite", 20);
        write(&tmp.path().join("xyz.dev"), "cookies.sqlite", 5);

        let locations = Locations {
            browsers: vec![store(ProfileLayout::ProfilesRoot(tmp.path().to_path_buf()))],
            ..Locations::default()
        };
        let parts = BrowserDataParts { history: true, cookies: true };
        let cleaner =
            BrowserDataCleaner::new(&locations, parts, Reclaimer::new(ReclaimMode::Permanent));

        assert_eq!(cleaner.estimate_size(&CancelToken::new()).unwrap(), 35);
        let metrics = cleaner.execute(&CancelToken::new()).unwrap();
        assert_eq!(metrics.files_processed, 3);
        assert_eq!(metrics.bytes_freed, 35);
    }

    #[test]
    fn cookies_only_leaves_history() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "places.sqlite", 10);
        write(tmp.path(), "cookies.sqlite", 5);

        let locations = Locations {
            browsers: vec![store(ProfileLayout::Single(tmp.path().to_path_buf()))],
            ..Locations::default()
        };
        let parts = BrowserDataParts { history: false, cookies: true };
        let cleaner =
            BrowserDataCleaner::new(&locations, parts, Reclaimer::new(ReclaimMode::Permanent));

        let metrics = cleaner.execute(&CancelToken::new()).unwrap();
        assert_eq!(metrics.bytes_freed, 5);
        assert!(tmp.path().join("places.sqlite").exists());
        assert!(!tmp.path().join("cookies.sqlite").exists());
    }

    #[test]
    fn missing_profile_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let missing = store(ProfileLayout::Single(tmp.path().join("Default")));
        assert!(profiles(&missing).is_empty());
    }
}
