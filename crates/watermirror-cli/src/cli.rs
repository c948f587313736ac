//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Omit header row in CSV output (useful for appending)
    #[arg(long)]
    pub no_header: bool,
}

impl OutputArgs {
    /// The effective format once the global `--json` shorthand is applied.
    pub fn resolve_format(&self, json: bool) -> OutputFormat {
        if json { OutputFormat::Json } else { self.format }
    }
}

#[derive(Parser)]
#[command(name = "watermirror")]
#[command(author, version, about = "CLI for WaterMirror water-quality sensors", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Use this configuration file instead of the default one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the sensor backend (overrides config)
    #[arg(short = 'u', long, global = true, env = "WATERMIRROR_URL")]
    pub url: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(short = 'T', long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the latest reading with levels and advisories
    Live {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Page through stored readings, newest first
    History {
        #[command(flatten)]
        output: OutputArgs,

        /// Number of pages to load
        #[arg(short, long, default_value = "1")]
        pages: u32,

        /// Readings per page (overrides config)
        #[arg(long)]
        page_size: Option<u32>,

        /// Keep loading until the backend has nothing older
        #[arg(short, long, conflicts_with = "pages")]
        all: bool,
    },

    /// Score report for the latest reading
    Report {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Poll the latest reading continuously
    Watch {
        #[command(flatten)]
        output: OutputArgs,

        /// Polling interval in seconds
        #[arg(short, long, default_value = "60")]
        interval: u64,

        /// Number of readings to take before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Base URL of the sensor backend
    BaseUrl,
    /// Request timeout in seconds
    Timeout,
    /// Readings per history page
    PageSize,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to reset
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}
