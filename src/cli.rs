use clap::{Parser, Subcommand, ValueEnum};
use disksweep_core::model::Category;
use disksweep_core::report::ReportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "disksweep",
    about = "Safely reclaim disk space: temp files, logs, browser data, aged files and OS caches",
    version
)]
pub struct Cli {
    /// Log at debug level instead of info
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show how much each selected category would reclaim (nothing is removed)
    Estimate {
        #[command(flatten)]
        selection: Selection,
    },

    /// Run the selected categories once
    Clean {
        #[command(flatten)]
        selection: Selection,

        /// Delete files outright instead of moving them to the trash
        #[arg(long)]
        permanent: bool,

        /// Write a report of the run to this file (the format decides the
        /// extension when the path has none)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value_t = Format::Text, requires = "report")]
        format: Format,
    },

    /// Run the selected categories every N hours until Enter is pressed
    Schedule {
        #[command(flatten)]
        selection: Selection,

        /// Hours between runs (defaults to the saved setting)
        #[arg(long)]
        hours: Option<u32>,

        /// Delete files outright instead of moving them to the trash
        #[arg(long)]
        permanent: bool,
    },

    /// Show or persist the effective settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the effective settings as JSON
    Show {
        #[command(flatten)]
        selection: Selection,
    },
    /// Save the effective settings to the config directory
    Save {
        #[command(flatten)]
        selection: Selection,

        /// Delete files outright instead of moving them to the trash
        #[arg(long)]
        permanent: bool,

        /// Hours between scheduled runs
        #[arg(long)]
        hours: Option<u32>,
    },
}

/// Category selection shared by every subcommand. Overrides the saved
/// settings for this invocation only.
#[derive(clap::Args, Clone, Default)]
pub struct Selection {
    /// Clean only these categories (temp-files, system-logs, old-files,
    /// browser-data, dns-cache)
    #[arg(long, num_args = 1.., value_parser = parse_category)]
    pub only: Vec<Category>,

    /// Age cutoff in days for old-files
    #[arg(long)]
    pub days: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Format {
    Json,
    Csv,
    Xml,
    Html,
    Text,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => ReportFormat::Json,
            Format::Csv => ReportFormat::Csv,
            Format::Xml => ReportFormat::Xml,
            Format::Html => ReportFormat::Html,
            Format::Text => ReportFormat::Text,
        }
    }
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::from_slug(s).ok_or_else(|| {
        let known: Vec<_> = Category::ALL.iter().map(|c| c.slug()).collect();
        format!("unknown category `{s}` (expected one of: {})", known.join(", "))
    })
}
