//! Water-quality classification and incremental history sync for WaterMirror
//! sensors.
//!
//! This crate turns raw readings from a WaterMirror sensor endpoint into
//! ordinal quality levels and advisories, and keeps a paginated history of
//! readings consistent across refresh, load-more and retries.
//!
//! # Features
//!
//! - **Classification**: fixed thresholds for temperature, pH, conductivity,
//!   dissolved oxygen and the composite score
//! - **Advisories**: a static tip for every `(parameter, level)` pair
//! - **Live view**: fetch, classify and advise on the newest reading
//! - **History**: paginated fetch, dedup-by-timestamp merges, single busy flag
//! - **Sources**: HTTP endpoint or in-memory mock with failure injection
//!
//! # Parameters
//!
//! | Parameter | Unit | Levels (low → high) |
//! |-----------|------|---------------------|
//! | Temperature | °C | Cold, Normal, Hot |
//! | pH | | Acid, Normal, Alkaline |
//! | EC | µS/cm | Good, Normal, Bad |
//! | Dissolved oxygen | mg/L | Good, Normal, Bad |
//! | Score | | ReallyBad, Poor, Marginal, Fair, Good, Excellent |
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use watermirror_core::{HttpSource, LiveMonitor, SyncController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(HttpSource::new("http://192.168.50.172:8001")?);
//!
//!     // Live view
//!     let live = LiveMonitor::new(Arc::clone(&source));
//!     if let Some(report) = live.refresh().await? {
//!         for advisory in &report.advisories {
//!             println!("{}", advisory);
//!         }
//!     }
//!
//!     // History view
//!     let history = SyncController::new(source, 10);
//!     history.on_focus().await?;
//!     history.on_scroll_near_end().await?;
//!     println!("{} readings", history.snapshot().items.len());
//!
//!     Ok(())
//! }
//! ```

pub mod advisory;
pub mod client;
pub mod error;
pub mod history;
pub mod live;
pub mod mock;
pub mod report;
pub mod sync;
pub mod thresholds;
pub mod traits;
pub mod transform;

// Core exports
pub use advisory::{Advisory, advise_for, advise_for_levels, advise_for_reading};
pub use client::HttpSource;
pub use error::{Error, Result};
pub use history::{
    DEFAULT_PAGE_SIZE, FetchPlan, HistoryPage, HistoryStore, Lifecycle, SyncOp, SyncOutcome,
};
pub use live::{LiveMonitor, LiveReport, LiveState};
pub use mock::{MockRequest, MockSource};
pub use report::{ScoreBand, ScoreReport};
pub use sync::{SyncController, Trigger};
pub use thresholds::{Band, ScoreCutoffs, ThresholdConfig, Thresholds, classify};
pub use traits::ReadingSource;
pub use transform::{ClassifiedParameter, DisplayRange, ReadingTransformer, display_ranges, transform};

// Re-export from watermirror-types
pub use watermirror_types::{Level, Parameter, Reading, ReadingBuilder};
