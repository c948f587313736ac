//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;
use watermirror_core::{ClassifiedParameter, HistoryPage, LiveReport, ScoreBand, ScoreReport};
use watermirror_types::{Level, Reading};

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Omit header row in CSV output.
    pub no_header: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self {
            no_color,
            ..Default::default()
        }
    }

    /// Create with no_header option for CSV output.
    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

/// Format a level as a bracketed tag, colored by how good it is.
#[must_use]
pub fn format_level(level: Level, no_color: bool) -> String {
    let label = level.to_string().to_uppercase();

    if no_color {
        return format!("[{}]", label);
    }
    match level {
        Level::Good | Level::Normal | Level::Excellent => format!("[{}]", label.green()),
        Level::Fair | Level::Marginal => format!("[{}]", label.yellow()),
        Level::Unknown => format!("[{}]", label.dimmed()),
        _ => format!("[{}]", label.red()),
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM`.
#[must_use]
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| "Unknown".to_string())
}

fn rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

fn csv_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn cell(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "--".to_string())
}

fn parameter_rows(parameters: &[ClassifiedParameter], opts: &FormatOptions) -> String {
    let mut output = String::new();
    for p in parameters {
        let range = p.current_range().map(|r| r.range).unwrap_or("");
        output.push_str(&format!(
            "  {:<24}{:>14}  {:<12}{}\n",
            p.parameter.name(),
            p.display_value(),
            range,
            format_level(p.level, opts.no_color)
        ));
    }
    output
}

fn advisory_rows<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    let mut output = String::from("\nAdvisories:\n");
    for text in texts {
        output.push_str(&format!("  - {}\n", text));
    }
    output
}

// ============================================================================
// Live formatting
// ============================================================================

#[must_use]
pub fn format_live_text(report: &LiveReport, opts: &FormatOptions) -> String {
    let mut output = format!(
        "Latest reading ({})\n\n",
        format_timestamp(report.reading.timestamp)
    );
    output.push_str(&parameter_rows(&report.parameters, opts));
    if !report.advisories.is_empty() {
        output.push_str(&advisory_rows(report.advisories.iter().map(|a| a.text)));
    }
    output
}

pub fn format_live_json(report: &LiveReport, opts: &FormatOptions) -> Result<String> {
    opts.as_json(report)
}

#[must_use]
pub fn format_live_csv(report: &LiveReport, opts: &FormatOptions) -> String {
    format_parameters_csv(report.reading.timestamp, &report.parameters, opts)
}

fn format_parameters_csv(
    timestamp: OffsetDateTime,
    parameters: &[ClassifiedParameter],
    opts: &FormatOptions,
) -> String {
    let mut output = if opts.no_header {
        String::new()
    } else {
        "timestamp,parameter,value,level\n".to_string()
    };
    let ts = rfc3339(timestamp);
    for p in parameters {
        output.push_str(&format!(
            "{},{},{},{}\n",
            ts,
            p.parameter,
            csv_value(p.value),
            p.level.label()
        ));
    }
    output
}

/// One status line for watch mode.
#[must_use]
pub fn format_watch_line(report: &LiveReport, opts: &FormatOptions) -> String {
    let mut parts = vec![format_timestamp(report.reading.timestamp)];
    for p in &report.parameters {
        parts.push(format!(
            "{} {}",
            p.display_value(),
            format_level(p.level, opts.no_color)
        ));
    }
    parts.join("  ") + "\n"
}

// ============================================================================
// History formatting
// ============================================================================

#[must_use]
pub fn format_history_text(page: &HistoryPage, opts: &FormatOptions) -> String {
    if page.items.is_empty() {
        let mut output = "No history records found.\n".to_string();
        if let Some(error) = &page.error {
            output.push_str(&format!("Last error: {}\n", error));
        }
        return output;
    }

    let mut output = format!("History ({} records):\n\n", page.items.len());
    output.push_str(&format!(
        "  {:<18}{:>8}{:>7}{:>8}{:>7}{:>7}\n",
        "Timestamp", "Temp", "pH", "EC", "DO", "Score"
    ));
    for reading in &page.items {
        output.push_str(&format!(
            "  {:<18}{:>8}{:>7}{:>8}{:>7}{:>7}\n",
            format_timestamp(reading.timestamp),
            cell(reading.temperature),
            cell(reading.ph),
            cell(reading.ec),
            cell(reading.dissolved_oxygen),
            cell(reading.score),
        ));
    }

    if page.has_more {
        output.push_str(&format!("\nMore available from page {}\n", page.cursor));
    } else {
        output.push_str("\nNo older readings\n");
    }
    if let Some(error) = &page.error {
        let line = format!("Last error: {}", error);
        if opts.no_color {
            output.push_str(&format!("{}\n", line));
        } else {
            output.push_str(&format!("{}\n", line.red()));
        }
    }
    output
}

#[must_use]
pub fn format_history_csv(readings: &[Reading], opts: &FormatOptions) -> String {
    let mut output = if opts.no_header {
        String::new()
    } else {
        "timestamp,temperature,ph,ec,do,score\n".to_string()
    };
    for r in readings {
        output.push_str(&format!(
            "{},{},{},{},{},{}\n",
            rfc3339(r.timestamp),
            csv_value(r.temperature),
            csv_value(r.ph),
            csv_value(r.ec),
            csv_value(r.dissolved_oxygen),
            csv_value(r.score),
        ));
    }
    output
}

pub fn format_history_json(page: &HistoryPage, opts: &FormatOptions) -> Result<String> {
    opts.as_json(page)
}

// ============================================================================
// Report formatting
// ============================================================================

#[must_use]
pub fn format_report_text(report: &ScoreReport, opts: &FormatOptions) -> String {
    let mut output = format!(
        "Report for {}\n\n{}\n\n",
        format_timestamp(report.reading.timestamp),
        report.summary()
    );

    output.push_str("Score bands (reference share):\n");
    for band in ScoreBand::ALL {
        let marker = if report.band == Some(band) { ">" } else { " " };
        output.push_str(&format!(
            "{} {:<8}{:<12}{:>5.1}%\n",
            marker,
            band.range(),
            band.to_string(),
            band.reference_share()
        ));
    }

    output.push('\n');
    output.push_str(&parameter_rows(&report.parameters, opts));
    if !report.advisories.is_empty() {
        output.push_str(&advisory_rows(report.advisories.iter().map(|a| a.text)));
    }
    output
}

pub fn format_report_json(report: &ScoreReport, opts: &FormatOptions) -> Result<String> {
    opts.as_json(report)
}

#[must_use]
pub fn format_report_csv(report: &ScoreReport, opts: &FormatOptions) -> String {
    format_parameters_csv(report.reading.timestamp, &report.parameters, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use watermirror_core::{Lifecycle, ReadingTransformer};

    fn sample() -> Reading {
        Reading::builder(datetime!(2025-05-01 08:30:00 UTC))
            .temperature(20.0)
            .ph(7.0)
            .ec(300.0)
            .dissolved_oxygen(7.0)
            .score(85.0)
            .build()
    }

    fn plain() -> FormatOptions {
        FormatOptions::new(true)
    }

    #[test]
    fn test_format_level_no_color() {
        assert_eq!(format_level(Level::Good, true), "[GOOD]");
        assert_eq!(format_level(Level::ReallyBad, true), "[REALLY BAD]");
        assert_eq!(format_level(Level::Acid, true), "[ACIDIC]");
        assert_eq!(format_level(Level::Unknown, true), "[UNKNOWN]");
    }

    #[test]
    fn test_format_level_with_color_contains_label() {
        assert!(format_level(Level::Hot, false).contains("HOT"));
        assert!(format_level(Level::Fair, false).contains("FAIR"));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(datetime!(2025-05-01 08:30:59 UTC)),
            "2025-05-01 08:30"
        );
    }

    #[test]
    fn test_live_text() {
        let report =
            LiveReport::from_readings(&[sample()], &ReadingTransformer::default()).unwrap();
        let text = format_live_text(&report, &plain());

        assert!(text.starts_with("Latest reading (2025-05-01 08:30)"));
        assert!(text.contains("20 °C"));
        assert!(text.contains("[NORMAL]"));
        assert!(text.contains("Advisories:"));
    }

    #[test]
    fn test_live_csv() {
        let report =
            LiveReport::from_readings(&[sample()], &ReadingTransformer::default()).unwrap();
        let csv = format_live_csv(&report, &plain());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "timestamp,parameter,value,level");
        assert_eq!(lines.len(), 6);
        assert!(lines[5].ends_with(",85,good"));

        let headless = format_live_csv(&report, &plain().with_no_header(true));
        assert_eq!(headless.lines().count(), 5);
    }

    #[test]
    fn test_history_text_empty_with_error() {
        let page = HistoryPage {
            error: Some("HTTP error! status: 500".to_string()),
            lifecycle: Lifecycle::Ready,
            ..Default::default()
        };
        let text = format_history_text(&page, &plain());
        assert!(text.contains("No history records found."));
        assert!(text.contains("HTTP error! status: 500"));
    }

    #[test]
    fn test_history_text_rows() {
        let page = HistoryPage {
            items: vec![sample(), Reading::empty(datetime!(2025-05-01 08:00:00 UTC))],
            cursor: 2,
            has_more: true,
            ..Default::default()
        };
        let text = format_history_text(&page, &plain());
        assert!(text.starts_with("History (2 records):"));
        assert!(text.contains("2025-05-01 08:00"));
        assert!(text.contains("--"));
        assert!(text.contains("More available from page 2"));
    }

    #[test]
    fn test_history_csv_missing_values() {
        let readings = [Reading::builder(datetime!(2025-05-01 08:00:00 UTC))
            .ph(7.2)
            .build()];
        let csv = format_history_csv(&readings, &plain());
        assert_eq!(
            csv,
            "timestamp,temperature,ph,ec,do,score\n2025-05-01T08:00:00Z,,7.2,,,\n"
        );
    }

    #[test]
    fn test_report_text_marks_band() {
        let report = ScoreReport::new(&sample());
        let text = format_report_text(&report, &plain());
        assert!(text.contains("80-100 band"));
        assert!(text.contains("> 80-100"));
        assert!(text.contains("58.0%"));
    }

    #[test]
    fn test_json_compact() {
        let report = ScoreReport::new(&sample());
        let json = format_report_json(&report, &plain().with_compact(true)).unwrap();
        assert_eq!(json.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["band"], "good");
    }
}
