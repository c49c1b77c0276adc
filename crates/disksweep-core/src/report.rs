/// Report rendering for a finished [`CleaningResult`].
///
/// JSON and CSV are machine-readable; XML and HTML keep the element and column
/// names of the cleaning report users already know; text is the terminal
/// summary.
use crate::error::{CleanError, Result};
use crate::model::size::{format_count, format_size};
use crate::model::CleaningResult;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const XML_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const CSV_HEADER: [&str; 7] = [
    "Service Name",
    "Success",
    "Error Message",
    "Files Processed",
    "Space Freed (bytes)",
    "Start Time",
    "End Time",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
    Xml,
    Html,
    Text,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }
}

pub fn render(result: &CleaningResult, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => {
            serde_json::to_string_pretty(result).map_err(|e| CleanError::Report(e.to_string()))
        }
        ReportFormat::Csv => render_csv(result),
        ReportFormat::Xml => Ok(render_xml(result)),
        ReportFormat::Html => Ok(render_html(result)),
        ReportFormat::Text => Ok(render_text(result)),
    }
}

/// Render and write to `path`.
pub fn write_report(result: &CleaningResult, format: ReportFormat, path: &Path) -> Result<()> {
    let content = render(result, format)?;
    fs::write(path, content).map_err(|e| CleanError::io(path, e))?;
    info!("Report saved to {}", path.display());
    Ok(())
}

fn timestamp(time: &DateTime<Local>) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn render_csv(result: &CleaningResult) -> Result<String> {
    let csv_err = |e: csv::Error| CleanError::Report(e.to_string());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_err)?;
    for service in &result.service_results {
        writer
            .write_record([
                service.service_name.clone(),
                service.success.to_string(),
                service.error_message.clone().unwrap_or_default(),
                service.files_processed.to_string(),
                service.bytes_freed.to_string(),
                timestamp(&service.start_time),
                timestamp(&service.end_time),
            ])
            .map_err(csv_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CleanError::Report(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CleanError::Report(e.to_string()))
}

fn render_xml(result: &CleaningResult) -> String {
    let time = |t: &DateTime<Local>| t.format(XML_TIME_FORMAT).to_string();
    let mut out = String::new();
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="utf-8"?>"#);
    let _ = writeln!(out, "<CleaningReport>");
    let _ = writeln!(out, "  <StartTime>{}</StartTime>", time(&result.start_time));
    let _ = writeln!(out, "  <EndTime>{}</EndTime>", time(&result.end_time));
    let _ = writeln!(out, "  <Duration>{:.1?}</Duration>", result.duration);
    let _ = writeln!(
        out,
        "  <TotalFilesProcessed>{}</TotalFilesProcessed>",
        result.total_files_processed
    );
    let _ = writeln!(out, "  <TotalSpaceFreed>{}</TotalSpaceFreed>", result.total_space_freed);
    let _ = writeln!(out, "  <ServiceResults>");
    for service in &result.service_results {
        let _ = writeln!(out, "    <ServiceResult>");
        let _ = writeln!(out, "      <ServiceName>{}</ServiceName>", escape(&service.service_name));
        let _ = writeln!(out, "      <Success>{}</Success>", service.success);
        let _ = writeln!(
            out,
            "      <ErrorMessage>{}</ErrorMessage>",
            escape(service.error_message.as_deref().unwrap_or_default())
        );
        let _ = writeln!(out, "      <FilesProcessed>{}</FilesProcessed>", service.files_processed);
        let _ = writeln!(out, "      <SpaceFreed>{}</SpaceFreed>", service.bytes_freed);
        let _ = writeln!(out, "      <StartTime>{}</StartTime>", time(&service.start_time));
        let _ = writeln!(out, "      <EndTime>{}</EndTime>", time(&service.end_time));
        let _ = writeln!(out, "    </ServiceResult>");
    }
    let _ = writeln!(out, "  </ServiceResults>");
    let _ = writeln!(out, "</CleaningReport>");
    out
}

const HTML_STYLE: &str = "\
    body { font-family: Arial, sans-serif; margin: 20px; }
    table { border-collapse: collapse; width: 100%; }
    th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
    th { background-color: #f2f2f2; }
    .success { color: green; }
    .error { color: red; }";

fn render_html(result: &CleaningResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html>");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "  <title>Cleaning Report</title>");
    let _ = writeln!(out, "  <style>\n    {HTML_STYLE}\n  </style>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "  <h1>Cleaning Report</h1>");
    let _ = writeln!(
        out,
        "  <p><strong>Total Files Processed:</strong> {}</p>",
        format_count(result.total_files_processed)
    );
    let _ = writeln!(
        out,
        "  <p><strong>Total Space Freed:</strong> {}</p>",
        format_size(result.total_space_freed)
    );
    let _ = writeln!(out, "  <p><strong>Duration:</strong> {:.1?}</p>", result.duration);
    let _ = writeln!(out, "  <table>");
    let _ = writeln!(
        out,
        "    <tr><th>Service Name</th><th>Status</th><th>Error Message</th>\
         <th>Files Processed</th><th>Space Freed</th><th>Start Time</th><th>End Time</th></tr>"
    );
    for service in &result.service_results {
        let (class, label) = if service.success {
            ("success", "Success")
        } else {
            ("error", "Failed")
        };
        let _ = writeln!(out, "    <tr>");
        let _ = writeln!(out, "      <td>{}</td>", escape(&service.service_name));
        let _ = writeln!(out, "      <td class=\"{class}\">{label}</td>");
        let _ = writeln!(
            out,
            "      <td>{}</td>",
            escape(service.error_message.as_deref().unwrap_or_default())
        );
        let _ = writeln!(out, "      <td>{}</td>", format_count(service.files_processed));
        let _ = writeln!(out, "      <td>{}</td>", format_size(service.bytes_freed));
        let _ = writeln!(out, "      <td>{}</td>", timestamp(&service.start_time));
        let _ = writeln!(out, "      <td>{}</td>", timestamp(&service.end_time));
        let _ = writeln!(out, "    </tr>");
    }
    let _ = writeln!(out, "  </table>");
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}

/// Escape text content for XML and HTML.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_text(result: &CleaningResult) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Cleaning Report");
    let _ = writeln!(out, "===============");
    let _ = writeln!(out, "Started:   {}", timestamp(&result.start_time));
    let _ = writeln!(out, "Finished:  {}", timestamp(&result.end_time));
    let _ = writeln!(out, "Duration:  {:.1?}", result.duration);
    let _ = writeln!(out, "Status:    {}", status(result.success));
    let _ = writeln!(out, "Files:     {}", format_count(result.total_files_processed));
    let _ = writeln!(out, "Freed:     {}", format_size(result.total_space_freed));
    let _ = writeln!(out);

    for service in &result.service_results {
        let _ = write!(
            out,
            "{:<26} {:<7} {:>10} files {:>12}",
            service.service_name,
            status(service.success),
            format_count(service.files_processed),
            format_size(service.bytes_freed),
        );
        if let Some(message) = &service.error_message {
            let _ = write!(out, "  ({message})");
        }
        let _ = writeln!(out);
    }
    out
}

fn status(success: bool) -> &'static str {
    if success {
        "OK"
    } else {
        "FAILED"
    }
}
