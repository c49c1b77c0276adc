/// Well-known locations each category cleaner targets.
///
/// [`Locations::system`] resolves the real per-OS paths once at start-up.
/// Tests build a [`Locations`] by hand that points every category at
/// temporary directories instead.
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A directory plus the file-name pattern and depth to scan it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDir {
    pub dir: PathBuf,
    pub pattern: String,
    pub max_depth: usize,
}

impl PatternDir {
    pub fn new(dir: impl Into<PathBuf>, pattern: &str, max_depth: usize) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.to_string(),
            max_depth,
        }
    }
}

/// Where a browser keeps its profile(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLayout {
    /// A single known profile directory.
    Single(PathBuf),
    /// Every immediate subdirectory of this directory is a profile.
    ProfilesRoot(PathBuf),
}

/// Named history and cookie stores for one browser vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserStore {
    pub vendor: String,
    pub layout: ProfileLayout,
    /// Paths relative to a profile directory.
    pub history_files: Vec<PathBuf>,
    pub cookie_files: Vec<PathBuf>,
}

/// Every path the five categories act on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locations {
    /// Temp roots shared by the temporary-files and aged-files categories.
    pub temp_dirs: Vec<PathBuf>,
    /// Prefetch-style cache, cleaned with the temp roots only if present.
    pub prefetch_dir: Option<PathBuf>,
    /// Thumbnail caches cleaned alongside temporary files.
    pub thumbnail_caches: Vec<PatternDir>,
    /// System-wide roots scanned for log-like files.
    pub log_roots: Vec<PathBuf>,
    pub log_patterns: Vec<String>,
    /// Individual crash-dump files.
    pub crash_dump_files: Vec<PathBuf>,
    /// Crash-dump directories.
    pub crash_dump_dirs: Vec<PatternDir>,
    pub browsers: Vec<BrowserStore>,
}

/// Extensions treated as disposable logs.
pub const LOG_PATTERNS: [&str; 5] = ["*.log", "*.old", "*.tmp", "*.bak", "*.trace"];

impl Locations {
    /// Resolve the real locations for the running OS.
    pub fn system() -> Self {
        let mut locations = os_locations();
        locations.temp_dirs = dedup_roots(locations.temp_dirs);
        locations.prefetch_dir = locations.prefetch_dir.filter(|p| p.is_dir());
        debug!("Resolved locations: {locations:?}");
        locations
    }

    /// Temp roots only; convenient for tests of the temp and aged categories.
    pub fn with_temp_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            temp_dirs: dirs.into_iter().collect(),
            log_patterns: log_patterns(),
            ..Self::default()
        }
    }
}

/// Remove roots that resolve to the same directory (e.g. `%TEMP%` and
/// `%LOCALAPPDATA%\Temp`), so one category never walks a tree twice.
fn dedup_roots(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    dirs.into_iter()
        .filter(|d| {
            let key = std::fs::canonicalize(d).unwrap_or_else(|_| d.clone());
            seen.insert(key)
        })
        .collect()
}

fn chromium(vendor: &str, profile: PathBuf) -> BrowserStore {
    BrowserStore {
        vendor: vendor.to_string(),
        layout: ProfileLayout::Single(profile),
        history_files: vec![PathBuf::from("History")],
        cookie_files: vec![
            PathBuf::from("Cookies"),
            Path::new("Network").join("Cookies"),
        ],
    }
}

fn firefox(profiles_root: PathBuf) -> BrowserStore {
    BrowserStore {
        vendor: "Firefox".to_string(),
        layout: ProfileLayout::ProfilesRoot(profiles_root),
        history_files: vec![PathBuf::from("places.sqlite")],
        cookie_files: vec![PathBuf::from("cookies.sqlite")],
    }
}

fn log_patterns() -> Vec<String> {
    LOG_PATTERNS.iter().map(|p| p.to_string()).collect()
}

#[cfg(windows)]
fn os_locations() -> Locations {
    let windows_dir = windows_directory().unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
    let system_dir = system_directory().unwrap_or_else(|| windows_dir.join("System32"));
    let local = dirs::data_local_dir();
    let roaming = dirs::data_dir();

    let mut temp_dirs = vec![std::env::temp_dir()];
    if let Some(local) = &local {
        temp_dirs.push(local.join("Temp"));
    }
    temp_dirs.push(system_dir.join("temp"));

    let thumbnail_caches = local
        .iter()
        .map(|l| {
            PatternDir::new(
                l.join("Microsoft").join("Windows").join("Explorer"),
                "thumbcache_*.db",
                0,
            )
        })
        .collect();

    let mut browsers = Vec::new();
    if let Some(local) = &local {
        browsers.push(chromium(
            "Chrome",
            local.join("Google").join("Chrome").join("User Data").join("Default"),
        ));
        browsers.push(chromium(
            "Edge",
            local.join("Microsoft").join("Edge").join("User Data").join("Default"),
        ));
    }
    if let Some(roaming) = &roaming {
        browsers.push(firefox(roaming.join("Mozilla").join("Firefox").join("Profiles")));
    }

    Locations {
        temp_dirs,
        prefetch_dir: Some(windows_dir.join("Prefetch")),
        thumbnail_caches,
        log_roots: vec![windows_dir.clone()],
        log_patterns: log_patterns(),
        crash_dump_files: vec![windows_dir.join("memory.dmp")],
        crash_dump_dirs: vec![PatternDir::new(
            windows_dir.join("Minidump"),
            "*.dmp",
            crate::scanner::DEFAULT_MAX_DEPTH,
        )],
        browsers,
    }
}

#[cfg(windows)]
fn windows_directory() -> Option<PathBuf> {
    use windows::Win32::System::SystemInformation::GetWindowsDirectoryW;
    let mut buffer = [0u16; 260];
    let len = unsafe { GetWindowsDirectoryW(Some(&mut buffer)) } as usize;
    (len > 0 && len < buffer.len()).then(|| PathBuf::from(String::from_utf16_lossy(&buffer[..len])))
}

#[cfg(windows)]
fn system_directory() -> Option<PathBuf> {
    use windows::Win32::System::SystemInformation::GetSystemDirectoryW;
    let mut buffer = [0u16; 260];
    let len = unsafe { GetSystemDirectoryW(Some(&mut buffer)) } as usize;
    (len > 0 && len < buffer.len()).then(|| PathBuf::from(String::from_utf16_lossy(&buffer[..len])))
}

#[cfg(not(windows))]
fn os_locations() -> Locations {
    use crate::scanner::DEFAULT_MAX_DEPTH;

    let home = dirs::home_dir();
    let config = dirs::config_dir();

    let thumbnail_caches = dirs::cache_dir()
        .map(|c| vec![PatternDir::new(c.join("thumbnails"), "*.png", 2)])
        .unwrap_or_default();

    let mut browsers = Vec::new();
    if cfg!(target_os = "macos") {
        if let Some(support) = dirs::data_dir() {
            browsers.push(chromium(
                "Chrome",
                support.join("Google").join("Chrome").join("Default"),
            ));
            browsers.push(chromium(
                "Edge",
                support.join("Microsoft Edge").join("Default"),
            ));
            browsers.push(firefox(support.join("Firefox").join("Profiles")));
        }
    } else {
        if let Some(config) = &config {
            browsers.push(chromium("Chrome", config.join("google-chrome").join("Default")));
            browsers.push(chromium("Edge", config.join("microsoft-edge").join("Default")));
        }
        if let Some(home) = &home {
            browsers.push(firefox(home.join(".mozilla").join("firefox")));
        }
    }

    let crash_dump_dirs = if cfg!(target_os = "macos") {
        home.iter()
            .map(|h| {
                PatternDir::new(
                    h.join("Library").join("Logs").join("DiagnosticReports"),
                    "*",
                    DEFAULT_MAX_DEPTH,
                )
            })
            .collect()
    } else {
        vec![
            PatternDir::new("/var/crash", "*", DEFAULT_MAX_DEPTH),
            PatternDir::new("/var/lib/systemd/coredump", "*", DEFAULT_MAX_DEPTH),
        ]
    };

    Locations {
        temp_dirs: vec![std::env::temp_dir(), PathBuf::from("/var/tmp")],
        prefetch_dir: None,
        thumbnail_caches,
        log_roots: vec![PathBuf::from("/var/log")],
        log_patterns: log_patterns(),
        crash_dump_files: Vec::new(),
        crash_dump_dirs,
        browsers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_temp_roots_collapse() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = tmp.path().to_path_buf();
        let b = tmp.path().join(".");
        let dirs = dedup_roots(vec![a.clone(), b]);
        assert_eq!(dirs, vec![a]);
    }

    #[test]
    fn system_locations_have_temp_roots_and_log_patterns() {
        let locations = Locations::system();
        assert!(!locations.temp_dirs.is_empty());
        assert_eq!(locations.log_patterns.len(), LOG_PATTERNS.len());
    }

    #[test]
    fn chromium_targets_both_cookie_layouts() {
        let store = chromium("Chrome", PathBuf::from("profile"));
        assert_eq!(store.history_files, vec![PathBuf::from("History")]);
        assert_eq!(store.cookie_files.len(), 2);
    }
}
