//! Report command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use watermirror_core::LiveMonitor;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{FormatOptions, format_report_csv, format_report_json, format_report_text};

use super::{build_source, write_output};

pub async fn cmd_report(
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let monitor = LiveMonitor::new(build_source(config)?);

    let Some(live) = monitor
        .refresh()
        .await
        .context("Failed to fetch the latest reading")?
    else {
        bail!("A live fetch is already in progress");
    };
    let report = live.score_report();

    let content = match format {
        OutputFormat::Json => format_report_json(&report, opts)?,
        OutputFormat::Text => format_report_text(&report, opts),
        OutputFormat::Csv => format_report_csv(&report, opts),
    };

    write_output(output, &content)
}
