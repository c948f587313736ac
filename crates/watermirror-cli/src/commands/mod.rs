//! Command implementations for the CLI.

mod config;
mod history;
mod live;
mod report;
mod watch;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use watermirror_core::HttpSource;

use crate::config::Config;

pub use config::cmd_config;
pub use history::{HistoryArgs, cmd_history};
pub use live::cmd_live;
pub use report::cmd_report;
pub use watch::{WatchArgs, cmd_watch};

/// Build the HTTP source described by a validated configuration.
pub fn build_source(config: &Config) -> Result<Arc<HttpSource>> {
    let source = HttpSource::with_timeout(&config.source.base_url, config.source.timeout())
        .with_context(|| format!("Invalid backend URL '{}'", config.source.base_url))?;
    Ok(Arc::new(source))
}

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Append output to file, or print it to stdout.
pub fn append_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            file.write_all(content.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
