//! Watch command implementation.
//!
//! Polls the live endpoint on a fixed interval. A failed poll is reported
//! and the next tick tries again; Ctrl-C stops the loop.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::warn;
use watermirror_core::{Error, LiveMonitor};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{FormatOptions, format_live_csv, format_watch_line};

use super::{append_output, build_source};

/// Arguments for the watch command.
pub struct WatchArgs<'a> {
    pub interval: u64,
    pub count: u32,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_watch(config: &Config, args: WatchArgs<'_>) -> Result<()> {
    let WatchArgs {
        interval,
        count,
        format,
        output,
        opts,
    } = args;

    let monitor = LiveMonitor::new(build_source(config)?);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut header_written = opts.no_header;
    let mut readings_taken: u32 = 0;

    loop {
        if count > 0 && readings_taken >= count {
            eprintln!("Completed {} readings.", readings_taken);
            return Ok(());
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                monitor.shutdown();
                eprintln!("Stopped after {} readings.", readings_taken);
                return Ok(());
            }
        }

        let report = match monitor.refresh().await {
            Ok(Some(report)) => report,
            Ok(None) => continue,
            Err(Error::Cancelled) => return Ok(()),
            Err(e) => {
                warn!("Poll failed: {}", e);
                continue;
            }
        };
        readings_taken += 1;

        let line = match format {
            OutputFormat::Text => format_watch_line(&report, opts),
            OutputFormat::Json => opts.with_compact(true).as_json(report.as_ref())?,
            OutputFormat::Csv => {
                let csv = format_live_csv(&report, &opts.with_no_header(header_written));
                header_written = true;
                csv
            }
        };
        append_output(output, &line)?;
    }
}
