//! Trait abstraction for the remote reading source.
//!
//! This module provides the [`ReadingSource`] trait that abstracts over the
//! real HTTP endpoint and the in-memory mock used in tests.

use async_trait::async_trait;

use watermirror_types::Reading;

use crate::error::Result;

/// The fetch contract of the sensor-data endpoint.
///
/// Both methods return readings newest-first. Implementations must not
/// retry on their own; failures go straight back to the caller.
///
/// # Example
///
/// ```ignore
/// use watermirror_core::{ReadingSource, Result};
///
/// async fn print_latest<S: ReadingSource>(source: &S) -> Result<()> {
///     let readings = source.fetch_latest().await?;
///     if let Some(r) = readings.first() {
///         println!("pH: {:?}", r.ph);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch the unpaginated reading list (`GET /history`).
    ///
    /// `result[0]` is the most recent reading.
    async fn fetch_latest(&self) -> Result<Vec<Reading>>;

    /// Fetch one page of history (`GET /history?page=<page>&limit=<limit>`).
    ///
    /// Pages are 1-based and hold at most `limit` readings.
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Reading>>;

    /// A short description of where readings come from, for logs.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

#[async_trait]
impl<S: ReadingSource + ?Sized> ReadingSource for std::sync::Arc<S> {
    async fn fetch_latest(&self) -> Result<Vec<Reading>> {
        (**self).fetch_latest().await
    }

    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Reading>> {
        (**self).fetch_page(page, limit).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
