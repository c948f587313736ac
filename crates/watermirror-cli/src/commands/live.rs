//! Live command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use watermirror_core::LiveMonitor;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{FormatOptions, format_live_csv, format_live_json, format_live_text};

use super::{build_source, write_output};

pub async fn cmd_live(
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let monitor = LiveMonitor::new(build_source(config)?);

    let Some(report) = monitor
        .refresh()
        .await
        .context("Failed to fetch the latest reading")?
    else {
        bail!("A live fetch is already in progress");
    };

    let content = match format {
        OutputFormat::Json => format_live_json(&report, opts)?,
        OutputFormat::Text => format_live_text(&report, opts),
        OutputFormat::Csv => format_live_csv(&report, opts),
    };

    write_output(output, &content)
}
