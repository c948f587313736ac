//! Command-line interface for WaterMirror water-quality sensors.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `live` | Latest reading with levels and advisories |
//! | `history` | Paginated history, newest first |
//! | `report` | Score band summary for the latest reading |
//! | `watch` | Poll the latest reading on an interval |
//! | `config` | Manage CLI configuration |
//! | `completions` | Generate shell completions |
//!
//! # Output Formats
//!
//! - **Text** (default): human-readable colored output
//! - **JSON**: machine-readable, pretty or `--compact`
//! - **CSV**: one row per reading (history) or per parameter (live, report)
//!
//! # Configuration
//!
//! Settings live in `~/.config/watermirror/config.toml` (or platform
//! equivalent); see [`config`]. Precedence is command-line flag, then
//! environment, then file, then built-in default.
//!
//! # Environment Variables
//!
//! - `WATERMIRROR_URL`: backend base URL (overridden by `--url`)
//! - `NO_COLOR`: disable colored output when set
//! - `RUST_LOG`: log filter when neither `--verbose` nor `--quiet` is given
//!
//! # Examples
//!
//! ```bash
//! watermirror live
//! watermirror history --pages 3 --format csv --output history.csv
//! watermirror report --json
//! watermirror --url http://10.0.0.5:8001 watch --interval 30
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;

pub use watermirror_core;
pub use watermirror_types;
