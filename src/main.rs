//! DiskSweep: safe disk space reclaimer.
//!
//! Thin binary entry point. All logic lives in the `disksweep-core` crate.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, Selection, SettingsAction};
use disksweep_core::model::size::format_size;
use disksweep_core::model::{CleaningOptions, CleaningResult, ReclaimMode};
use disksweep_core::platform::is_elevated;
use disksweep_core::report::{self, ReportFormat};
use disksweep_core::settings::Settings;
use disksweep_core::{CancelToken, Orchestrator, Scheduler};
use std::io::BufRead;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    tracing::info!("DiskSweep starting");
    if !is_elevated() {
        tracing::info!("Not running elevated; system-wide locations will be partly skipped");
    }

    let settings = Settings::load();

    match cli.command {
        Command::Estimate { selection } => {
            let options = effective_options(&settings, &selection, false);
            let estimates = Orchestrator::system().estimate(&options, &CancelToken::new())?;
            let mut total = 0;
            for (category, bytes) in estimates {
                println!("{:<26} {:>12}", category.label(), format_size(bytes));
                total += bytes;
            }
            println!("{:<26} {:>12}", "Total", format_size(total));
        }

        Command::Clean {
            selection,
            permanent,
            report: report_path,
            format,
        } => {
            let options = effective_options(&settings, &selection, permanent);
            let result = Orchestrator::system().run(&options, &CancelToken::new());
            print!("{}", report::render(&result, ReportFormat::Text)?);
            if let Some(mut path) = report_path {
                let format = ReportFormat::from(format);
                if path.extension().is_none() {
                    path.set_extension(format.extension());
                }
                report::write_report(&result, format, &path)
                    .with_context(|| format!("writing report to {}", path.display()))?;
            }
            fail_unless_successful(&result)?;
        }

        Command::Schedule {
            selection,
            hours,
            permanent,
        } => {
            let options = effective_options(&settings, &selection, permanent);
            let hours = hours
                .or(settings.schedule_hours)
                .context("no interval given: pass --hours or save one with `settings save --hours`")?;

            let scheduler = Scheduler::new(Arc::new(Orchestrator::system()));
            scheduler.schedule(options, hours)?;
            println!("Cleaning every {hours} hour(s). Press Enter to stop.");

            // Returns on Enter or when stdin is closed.
            let mut line = String::new();
            let _ = std::io::stdin().lock().read_line(&mut line);

            scheduler.cancel_schedule();
            if let Some(last) = scheduler.last_result() {
                println!(
                    "{} scheduled run(s); last freed {}",
                    scheduler.runs_completed(),
                    format_size(last.total_space_freed)
                );
            }
        }

        Command::Settings { action } => match action {
            SettingsAction::Show { selection } => {
                let shown = Settings {
                    options: effective_options(&settings, &selection, false),
                    ..settings
                };
                println!("{}", shown.to_json()?);
            }
            SettingsAction::Save {
                selection,
                permanent,
                hours,
            } => {
                let saved = Settings {
                    options: effective_options(&settings, &selection, permanent),
                    schedule_hours: hours.or(settings.schedule_hours),
                };
                let path = saved.save()?;
                println!("Settings saved to {}", path.display());
            }
        },
    }

    Ok(())
}

/// Saved settings with this invocation's flags applied on top.
fn effective_options(
    settings: &Settings,
    selection: &Selection,
    permanent: bool,
) -> CleaningOptions {
    let mut options = if selection.only.is_empty() {
        settings.options.clone()
    } else {
        CleaningOptions {
            old_files_days: settings.options.old_files_days,
            reclaim_mode: settings.options.reclaim_mode,
            ..CleaningOptions::only(&selection.only)
        }
    };
    if let Some(days) = selection.days {
        options.old_files_days = days;
    }
    if permanent {
        options.reclaim_mode = ReclaimMode::Permanent;
    }
    options
}

fn fail_unless_successful(result: &CleaningResult) -> anyhow::Result<()> {
    if !result.success {
        let failed: Vec<_> = result
            .service_results
            .iter()
            .filter(|s| !s.success)
            .map(|s| s.service_name.as_str())
            .collect();
        anyhow::bail!("cleaning finished with failures: {}", failed.join(", "));
    }
    Ok(())
}
