//! Mock reading source for testing.
//!
//! This module provides an in-memory source that can be used for unit
//! testing without a running sensor endpoint.
//!
//! The [`MockSource`] implements the [`ReadingSource`] trait, allowing it to
//! be used interchangeably with [`HttpSource`](crate::HttpSource) in generic
//! code.
//!
//! # Features
//!
//! - **Failure injection**: fail every request, or only the next few, with an
//!   HTTP status or a transport error
//! - **Latency simulation**: add artificial delays to simulate a slow network
//! - **Request log**: inspect which pages were requested

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use watermirror_types::Reading;

use crate::error::{Error, Result};
use crate::traits::ReadingSource;

const MOCK_URL: &str = "mock://history";

/// A request observed by a [`MockSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockRequest {
    /// `GET /history`
    Latest,
    /// `GET /history?page=&limit=`
    Page { page: u32, limit: u32 },
}

/// An in-memory reading source for testing.
///
/// Readings are held newest-first and served in `limit`-sized pages.
///
/// # Example
///
/// ```
/// use watermirror_core::{MockSource, ReadingSource};
/// use watermirror_types::Reading;
/// use time::OffsetDateTime;
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockSource::new();
///     source.set_readings(vec![Reading::empty(OffsetDateTime::UNIX_EPOCH)]).await;
///
///     let page = source.fetch_page(1, 10).await.unwrap();
///     assert_eq!(page.len(), 1);
///     assert_eq!(source.fetch_count(), 1);
/// }
/// ```
pub struct MockSource {
    readings: RwLock<Vec<Reading>>,
    requests: RwLock<Vec<MockRequest>>,
    fetch_count: AtomicU32,
    should_fail: AtomicBool,
    /// HTTP status to fail with; 0 means a transport error.
    fail_status: AtomicU32,
    fail_message: RwLock<String>,
    /// Simulated latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    /// Number of requests left to fail before succeeding again.
    remaining_failures: AtomicU32,
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self {
            readings: RwLock::new(Vec::new()),
            requests: RwLock::new(Vec::new()),
            fetch_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
            fail_status: AtomicU32::new(0),
            fail_message: RwLock::new("Mock failure".to_string()),
            latency_ms: AtomicU64::new(0),
            remaining_failures: AtomicU32::new(0),
        }
    }

    /// Create a mock source serving the given readings.
    ///
    /// The readings are sorted newest-first.
    pub fn with_readings(mut readings: Vec<Reading>) -> Self {
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self {
            readings: RwLock::new(readings),
            ..Self::new()
        }
    }

    // --- Test control methods ---

    /// Replace the served readings. They are sorted newest-first.
    pub async fn set_readings(&self, mut readings: Vec<Reading>) {
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        *self.readings.write().await = readings;
    }

    /// Add readings and re-sort newest-first.
    pub async fn add_readings(&self, readings: Vec<Reading>) {
        let mut current = self.readings.write().await;
        current.extend(readings);
        current.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }

    /// Number of readings currently served.
    pub async fn len(&self) -> usize {
        self.readings.read().await.len()
    }

    /// Whether no readings are served.
    pub async fn is_empty(&self) -> bool {
        self.readings.read().await.is_empty()
    }

    /// Fail every request with a transport error until cleared.
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        self.fail_status.store(0, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Fail every request with the given HTTP status until cleared.
    pub fn set_fail_status(&self, status: Option<u16>) {
        match status {
            Some(status) => {
                self.fail_status.store(u32::from(status), Ordering::Relaxed);
                self.should_fail.store(true, Ordering::Relaxed);
            }
            None => {
                self.fail_status.store(0, Ordering::Relaxed);
                self.should_fail.store(false, Ordering::Relaxed);
            }
        }
    }

    /// Fail the next `count` requests, then succeed.
    ///
    /// ```
    /// use watermirror_core::MockSource;
    ///
    /// let source = MockSource::new();
    /// // First 2 requests fail, the 3rd succeeds
    /// source.set_transient_failures(2);
    /// assert_eq!(source.remaining_failures(), 2);
    /// ```
    pub fn set_transient_failures(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Number of transient failures left.
    pub fn remaining_failures(&self) -> u32 {
        self.remaining_failures.load(Ordering::Relaxed)
    }

    /// Set simulated latency for every request.
    ///
    /// Set to `Duration::ZERO` to disable latency simulation.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of requests made, failed ones included.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// All requests made so far, oldest first.
    pub async fn requests(&self) -> Vec<MockRequest> {
        self.requests.read().await.clone()
    }

    /// Forget the request log and count.
    pub async fn reset_requests(&self) {
        self.requests.write().await.clear();
        self.fetch_count.store(0, Ordering::Relaxed);
    }

    async fn begin(&self, request: MockRequest) -> Result<()> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.requests.write().await.push(request);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let transient = self
            .remaining_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();

        if transient || self.should_fail.load(Ordering::Relaxed) {
            return Err(self.failure().await);
        }
        Ok(())
    }

    async fn failure(&self) -> Error {
        match self.fail_status.load(Ordering::Relaxed) {
            0 => Error::transport(MOCK_URL, self.fail_message.read().await.clone()),
            status => Error::http(status as u16, MOCK_URL),
        }
    }
}

#[async_trait]
impl ReadingSource for MockSource {
    async fn fetch_latest(&self) -> Result<Vec<Reading>> {
        self.begin(MockRequest::Latest).await?;
        Ok(self.readings.read().await.clone())
    }

    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Reading>> {
        self.begin(MockRequest::Page { page, limit }).await?;

        if page == 0 {
            return Ok(Vec::new());
        }
        let readings = self.readings.read().await;
        let start = (page as usize - 1).saturating_mul(limit as usize);
        Ok(readings
            .iter()
            .skip(start)
            .take(limit as usize)
            .copied()
            .collect())
    }

    fn describe(&self) -> String {
        MOCK_URL.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn at(secs: i64) -> Reading {
        let ts = OffsetDateTime::from_unix_timestamp(secs).unwrap();
        Reading::builder(ts).score(secs as f64).build()
    }

    #[tokio::test]
    async fn test_mock_source_pages() {
        let source = MockSource::with_readings((1..=25).map(at).collect());

        let first = source.fetch_page(1, 10).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].score, Some(25.0));

        let third = source.fetch_page(3, 10).await.unwrap();
        assert_eq!(third.len(), 5);
        assert_eq!(third[4].score, Some(1.0));

        assert!(source.fetch_page(4, 10).await.unwrap().is_empty());
        assert!(source.fetch_page(0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_source_latest_is_newest_first() {
        let source = MockSource::new();
        source.set_readings(vec![at(1), at(3), at(2)]).await;

        let latest = source.fetch_latest().await.unwrap();
        assert_eq!(latest[0].score, Some(3.0));
        assert_eq!(source.len().await, 3);
    }

    #[tokio::test]
    async fn test_mock_source_fail_transport() {
        let source = MockSource::new();
        source.set_should_fail(true, Some("boom")).await;

        let err = source.fetch_latest().await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert!(err.to_string().contains("boom"));

        source.set_should_fail(false, None).await;
        assert!(source.fetch_latest().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_source_fail_status() {
        let source = MockSource::new();
        source.set_fail_status(Some(500));

        let err = source.fetch_page(1, 10).await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        source.set_fail_status(None);
        assert!(source.fetch_page(1, 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_source_transient_failures() {
        let source = MockSource::new();
        source.set_transient_failures(2);

        assert!(source.fetch_latest().await.is_err());
        assert!(source.fetch_latest().await.is_err());
        assert!(source.fetch_latest().await.is_ok());
        assert_eq!(source.remaining_failures(), 0);
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_source_request_log() {
        let source = MockSource::new();
        let _ = source.fetch_latest().await;
        let _ = source.fetch_page(2, 5).await;

        assert_eq!(
            source.requests().await,
            vec![MockRequest::Latest, MockRequest::Page { page: 2, limit: 5 }]
        );

        source.reset_requests().await;
        assert!(source.requests().await.is_empty());
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_source_latency() {
        let source = MockSource::new();
        source.set_latency(Duration::from_millis(200));

        let start = tokio::time::Instant::now();
        source.fetch_latest().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_mock_source_via_trait() {
        async fn count<S: ReadingSource>(s: &S) -> usize {
            s.fetch_latest().await.map(|r| r.len()).unwrap_or(0)
        }
        let source = MockSource::with_readings(vec![at(1)]);
        assert_eq!(count(&source).await, 1);
        assert_eq!(source.describe(), "mock://history");
    }
}
