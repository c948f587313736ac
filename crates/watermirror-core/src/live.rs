//! Live-reading view state.
//!
//! [`LiveMonitor`] fetches the unpaginated reading list, classifies its most
//! recent entry, and keeps the result together with a loading flag and an
//! error slot. A failed refresh keeps the previous report visible.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use watermirror_types::Reading;

use crate::advisory::{Advisory, advise_for_reading};
use crate::error::{Error, Result};
use crate::report::ScoreReport;
use crate::traits::ReadingSource;
use crate::transform::{ClassifiedParameter, ReadingTransformer};

/// Everything the live view shows for one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveReport {
    /// The most recent reading.
    pub reading: Reading,
    pub parameters: Vec<ClassifiedParameter>,
    pub advisories: Vec<Advisory>,
    /// When the fetch completed.
    #[serde(with = "time::serde::rfc3339")]
    pub fetched_at: OffsetDateTime,
}

impl LiveReport {
    /// Classify the newest reading of a live payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPayload`] when `readings` is empty.
    pub fn from_readings(readings: &[Reading], transformer: &ReadingTransformer) -> Result<Self> {
        let reading = *readings.first().ok_or(Error::EmptyPayload)?;
        let parameters = transformer.classify(&reading);
        let advisories = advise_for_reading(&parameters);
        Ok(Self {
            reading,
            parameters,
            advisories,
            fetched_at: OffsetDateTime::now_utc(),
        })
    }

    /// The aggregate score report for the same reading.
    pub fn score_report(&self) -> ScoreReport {
        ScoreReport::new(&self.reading)
    }
}

/// Observable state of the live view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveState {
    pub loading: bool,
    /// Message of the last failed fetch, cleared on success.
    pub error: Option<String>,
    /// The last successful report.
    pub report: Option<Arc<LiveReport>>,
}

/// Fetches and classifies the latest reading.
pub struct LiveMonitor<S: ReadingSource + ?Sized> {
    source: Arc<S>,
    transformer: ReadingTransformer,
    busy: AtomicBool,
    cancel_token: CancellationToken,
    state_tx: watch::Sender<LiveState>,
}

impl<S: ReadingSource + ?Sized> std::fmt::Debug for LiveMonitor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveMonitor")
            .field("source", &self.source.describe())
            .field("busy", &self.busy.load(Ordering::SeqCst))
            .finish()
    }
}

/// Clears the busy and loading flags when a refresh ends, even if its
/// future is dropped mid-fetch.
struct Refreshing<'a, S: ReadingSource + ?Sized> {
    monitor: &'a LiveMonitor<S>,
}

impl<S: ReadingSource + ?Sized> Drop for Refreshing<'_, S> {
    fn drop(&mut self) {
        self.monitor
            .state_tx
            .send_if_modified(|s| std::mem::replace(&mut s.loading, false));
        self.monitor.busy.store(false, Ordering::SeqCst);
    }
}

impl<S: ReadingSource + ?Sized> LiveMonitor<S> {
    /// Create a monitor using the standard thresholds.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_transformer(source, ReadingTransformer::default())
    }

    /// Create a monitor with a custom transformer.
    pub fn with_transformer(source: Arc<S>, transformer: ReadingTransformer) -> Self {
        let (state_tx, _) = watch::channel(LiveState::default());
        Self {
            source,
            transformer,
            busy: AtomicBool::new(false),
            cancel_token: CancellationToken::new(),
            state_tx,
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LiveState> {
        self.state_tx.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> LiveState {
        self.state_tx.borrow().clone()
    }

    /// The last successful report.
    pub fn latest(&self) -> Option<Arc<LiveReport>> {
        self.state_tx.borrow().report.clone()
    }

    /// Stop applying results.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    /// Fetch and classify the latest reading.
    ///
    /// Returns `Ok(None)` when a fetch is already in flight.
    ///
    /// # Errors
    ///
    /// Transport, decode and [`Error::EmptyPayload`] failures are recorded
    /// in the error slot and returned; the previous report is kept.
    pub async fn refresh(&self) -> Result<Option<Arc<LiveReport>>> {
        if self.cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Live fetch already in flight, skipping");
            return Ok(None);
        }

        let _guard = Refreshing { monitor: self };
        self.state_tx.send_modify(|s| s.loading = true);
        let result = self
            .source
            .fetch_latest()
            .await
            .and_then(|readings| LiveReport::from_readings(&readings, &self.transformer));

        if self.cancel_token.is_cancelled() {
            warn!("Live monitor shut down during fetch, dropping result");
            return Err(Error::Cancelled);
        }

        match result {
            Ok(report) => {
                let report = Arc::new(report);
                info!(
                    timestamp = %report.reading.timestamp,
                    advisories = report.advisories.len(),
                    "Live reading updated"
                );
                self.state_tx.send_modify(|s| {
                    s.loading = false;
                    s.error = None;
                    s.report = Some(Arc::clone(&report));
                });
                Ok(Some(report))
            }
            Err(e) => {
                warn!("Live fetch failed: {}", e);
                self.state_tx.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use time::macros::datetime;
    use watermirror_types::{Level, Parameter};

    use super::*;
    use crate::mock::MockSource;

    fn sample() -> Reading {
        Reading::builder(datetime!(2025-05-01 08:30:00 UTC))
            .temperature(20.0)
            .ph(7.0)
            .ec(300.0)
            .dissolved_oxygen(7.0)
            .score(85.0)
            .build()
    }

    #[tokio::test]
    async fn test_live_refresh_scenario() {
        let source = Arc::new(MockSource::with_readings(vec![sample()]));
        let monitor = LiveMonitor::new(source);

        let report = monitor.refresh().await.unwrap().unwrap();

        let levels: Vec<Level> = report.parameters.iter().map(|p| p.level).collect();
        assert_eq!(
            levels,
            vec![
                Level::Normal,
                Level::Normal,
                Level::Normal,
                Level::Normal,
                Level::Good
            ]
        );
        assert_eq!(report.advisories.len(), 5);
        let no_adjustment = report
            .advisories
            .iter()
            .filter(|a| a.text.contains("no adjustment"))
            .count();
        assert_eq!(no_adjustment, 4);
        assert_eq!(report.advisories[4].parameter, Parameter::Score);

        let state = monitor.state();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert!(monitor.latest().is_some());
    }

    #[tokio::test]
    async fn test_live_empty_payload() {
        let monitor = LiveMonitor::new(Arc::new(MockSource::new()));
        let err = monitor.refresh().await.unwrap_err();
        assert!(matches!(err, Error::EmptyPayload));
        assert_eq!(
            monitor.state().error.as_deref(),
            Some("No valid data received")
        );
    }

    #[tokio::test]
    async fn test_live_failure_keeps_previous_report() {
        let source = Arc::new(MockSource::with_readings(vec![sample()]));
        let monitor = LiveMonitor::new(Arc::clone(&source));
        monitor.refresh().await.unwrap();

        source.set_fail_status(Some(503));
        let err = monitor.refresh().await.unwrap_err();
        assert_eq!(err.status(), Some(503));

        let state = monitor.state();
        assert!(state.report.is_some());
        assert!(state.error.unwrap().contains("503"));

        source.set_fail_status(None);
        monitor.refresh().await.unwrap();
        assert_eq!(monitor.state().error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_refresh_releases_flags() {
        let source = Arc::new(MockSource::with_readings(vec![sample()]));
        let monitor = LiveMonitor::new(Arc::clone(&source));
        source.set_latency(Duration::from_secs(1));

        let timed_out = tokio::time::timeout(Duration::from_millis(10), monitor.refresh()).await;
        assert!(timed_out.is_err());
        assert!(!monitor.state().loading);

        source.set_latency(Duration::ZERO);
        assert!(monitor.refresh().await.unwrap().is_some());
        assert!(!monitor.state().loading);
    }

    #[tokio::test]
    async fn test_live_shutdown() {
        let monitor = LiveMonitor::new(Arc::new(MockSource::with_readings(vec![sample()])));
        monitor.shutdown();
        assert!(matches!(monitor.refresh().await, Err(Error::Cancelled)));
    }

    #[test]
    fn test_score_report_from_live() {
        let report = LiveReport::from_readings(&[sample()], &ReadingTransformer::default()).unwrap();
        let score = report.score_report();
        assert_eq!(score.level, Level::Good);
        assert_eq!(score.reading, report.reading);
    }
}
