/// Run configuration: which categories to clean and how to reclaim files.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default age cutoff for the aged-files category.
pub const DEFAULT_OLD_FILES_DAYS: u32 = 30;

/// The five disposable-file classes.
///
/// Declaration order is the order categories appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    TemporaryFiles,
    SystemLogs,
    AgedFiles,
    BrowserData,
    DnsCache,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::TemporaryFiles,
        Category::SystemLogs,
        Category::AgedFiles,
        Category::BrowserData,
        Category::DnsCache,
    ];

    /// Human-readable label used in logs and reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::TemporaryFiles => "Temporary Files Cleaner",
            Self::SystemLogs => "System Logs Cleaner",
            Self::AgedFiles => "Old Files Cleaner",
            Self::BrowserData => "Browser Data Cleaner",
            Self::DnsCache => "DNS Cache Cleaner",
        }
    }

    /// Machine-readable name used on the command line and in thread names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::TemporaryFiles => "temp-files",
            Self::SystemLogs => "system-logs",
            Self::AgedFiles => "old-files",
            Self::BrowserData => "browser-data",
            Self::DnsCache => "dns-cache",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a reclaimed file leaves its original location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReclaimMode {
    /// Move to the OS trash / Recycle Bin (recoverable).
    #[default]
    Trash,
    /// Delete outright.
    Permanent,
}

/// Options for one cleaning run. Every category defaults to included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    pub include_temporary_files: bool,
    pub include_log_files: bool,
    pub include_event_logs: bool,
    pub include_old_files: bool,
    pub include_browser_history: bool,
    pub include_browser_cookies: bool,
    pub include_dns_cache: bool,
    /// Files older than this many days qualify for the aged-files category.
    pub old_files_days: u32,
    pub reclaim_mode: ReclaimMode,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            include_temporary_files: true,
            include_log_files: true,
            include_event_logs: true,
            include_old_files: true,
            include_browser_history: true,
            include_browser_cookies: true,
            include_dns_cache: true,
            old_files_days: DEFAULT_OLD_FILES_DAYS,
            reclaim_mode: ReclaimMode::Trash,
        }
    }
}

impl CleaningOptions {
    /// Options with every category switched off.
    pub fn none() -> Self {
        Self {
            include_temporary_files: false,
            include_log_files: false,
            include_event_logs: false,
            include_old_files: false,
            include_browser_history: false,
            include_browser_cookies: false,
            include_dns_cache: false,
            ..Self::default()
        }
    }

    /// Options that enable exactly the given categories (all of their flags).
    pub fn only(categories: &[Category]) -> Self {
        let mut options = Self::none();
        for &category in categories {
            options.enable(category);
        }
        options
    }

    /// Switch on every flag that selects `category`.
    pub fn enable(&mut self, category: Category) {
        match category {
            Category::TemporaryFiles => self.include_temporary_files = true,
            Category::SystemLogs => {
                self.include_log_files = true;
                self.include_event_logs = true;
            }
            Category::AgedFiles => self.include_old_files = true,
            Category::BrowserData => {
                self.include_browser_history = true;
                self.include_browser_cookies = true;
            }
            Category::DnsCache => self.include_dns_cache = true,
        }
    }

    /// The distinct categories these options select, in report order.
    ///
    /// System Logs serves both the log-file and event-log flags, and Browser
    /// Data serves both the history and cookie flags; each appears at most once.
    pub fn selected_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|&c| match c {
                Category::TemporaryFiles => self.include_temporary_files,
                Category::SystemLogs => self.include_log_files || self.include_event_logs,
                Category::AgedFiles => self.include_old_files,
                Category::BrowserData => {
                    self.include_browser_history || self.include_browser_cookies
                }
                Category::DnsCache => self.include_dns_cache,
            })
            .collect()
    }
}
