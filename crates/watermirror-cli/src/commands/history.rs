//! History command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use watermirror_core::{HistoryPage, ReadingSource, SyncController, SyncOutcome};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{FormatOptions, format_history_csv, format_history_json, format_history_text};

use super::{build_source, write_output};

/// Arguments for the history command.
pub struct HistoryArgs<'a> {
    /// Pages to load; `None` loads until the backend runs out.
    pub pages: Option<u32>,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_history(config: &Config, args: HistoryArgs<'_>) -> Result<()> {
    let HistoryArgs {
        pages,
        format,
        output,
        quiet,
        opts,
    } = args;

    let controller = SyncController::new(build_source(config)?, config.history.page_size);
    let page = collect_pages(&controller, pages).await?;

    if !quiet && matches!(format, OutputFormat::Text) {
        eprintln!("Loaded {} readings.", page.items.len());
    }

    let content = match format {
        OutputFormat::Json => format_history_json(&page, opts)?,
        OutputFormat::Text => format_history_text(&page, opts),
        OutputFormat::Csv => format_history_csv(&page.items, opts),
    };

    write_output(output, &content)
}

/// Run the initial load, then scroll until `pages` pages are held or the
/// backend has nothing older.
///
/// A failed load-more stops paging but keeps what was loaded.
pub async fn collect_pages<S: ReadingSource + ?Sized>(
    controller: &SyncController<S>,
    pages: Option<u32>,
) -> Result<Arc<HistoryPage>> {
    controller
        .on_focus()
        .await
        .context("Failed to load history")?;

    let mut loaded = 1u32;
    while pages.is_none_or(|limit| loaded < limit) && controller.snapshot().has_more {
        match controller.on_scroll_near_end().await? {
            SyncOutcome::Appended(count) => {
                loaded += 1;
                debug!("Page {} added {} readings", loaded, count);
            }
            SyncOutcome::MoreFailed => {
                warn!("Stopped after {} pages: loading older readings failed", loaded);
                break;
            }
            _ => break,
        }
    }

    Ok(controller.snapshot())
}
