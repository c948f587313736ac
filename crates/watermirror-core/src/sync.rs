//! Trigger-driven history synchronisation.
//!
//! [`SyncController`] binds [`HistoryStore`] operations to the events a
//! history view produces:
//!
//! | Trigger | Operation |
//! |---------|-----------|
//! | [`Trigger::Focus`] | initial load, only while uninitialised |
//! | [`Trigger::PullToRefresh`] | refresh |
//! | [`Trigger::ScrollNearEnd`] | load more |
//! | [`Trigger::Retry`] | initial load |
//!
//! A single busy flag guarantees at most one operation in flight; a trigger
//! that arrives while busy is skipped rather than queued. The store lock is
//! only held for the synchronous begin/complete steps, never across the
//! fetch. Every state change is published as an immutable
//! [`HistoryPage`] snapshot on a `watch` channel.
//!
//! After each fetch the controller checks that it is still live. Once
//! [`SyncController::shutdown`] has been called, late results are dropped
//! and the operation reports [`Error::Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::history::{HistoryPage, HistoryStore, Lifecycle, SyncOp, SyncOutcome};
use crate::traits::ReadingSource;

/// Events that drive history synchronisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The history view gained focus.
    Focus,
    /// The user pulled to refresh.
    PullToRefresh,
    /// The list was scrolled close to its end.
    ScrollNearEnd,
    /// The user asked to retry after a failure.
    Retry,
}

/// Orchestrates a [`HistoryStore`] against a [`ReadingSource`].
pub struct SyncController<S: ReadingSource + ?Sized> {
    source: Arc<S>,
    store: Mutex<HistoryStore>,
    busy: AtomicBool,
    cancel_token: CancellationToken,
    snapshot_tx: watch::Sender<Arc<HistoryPage>>,
}

impl<S: ReadingSource + ?Sized> std::fmt::Debug for SyncController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncController")
            .field("source", &self.source.describe())
            .field("busy", &self.busy.load(Ordering::SeqCst))
            .field("live", &self.is_live())
            .finish()
    }
}

/// Clears the busy flag, and any store flag left set, when an operation
/// ends or its future is dropped mid-fetch.
struct InFlight<'a, S: ReadingSource + ?Sized> {
    controller: &'a SyncController<S>,
    pending: Option<SyncOp>,
}

impl<S: ReadingSource + ?Sized> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if let Some(op) = self.pending.take() {
            self.controller.update(|store| store.abort(op));
        }
        self.controller.busy.store(false, Ordering::SeqCst);
    }
}

impl<S: ReadingSource + ?Sized> SyncController<S> {
    /// Create a controller with an empty store.
    pub fn new(source: Arc<S>, page_size: u32) -> Self {
        let store = HistoryStore::new(page_size);
        let (snapshot_tx, _) = watch::channel(Arc::new(store.page().clone()));
        Self {
            source,
            store: Mutex::new(store),
            busy: AtomicBool::new(false),
            cancel_token: CancellationToken::new(),
            snapshot_tx,
        }
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<HistoryPage>> {
        self.snapshot_tx.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<HistoryPage> {
        self.snapshot_tx.borrow().clone()
    }

    /// Whether an operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Whether results are still being applied.
    pub fn is_live(&self) -> bool {
        !self.cancel_token.is_cancelled()
    }

    /// Tear the controller down. Results of fetches still in flight are
    /// dropped.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    /// Handle a trigger.
    ///
    /// Returns [`SyncOutcome::Skipped`] when another operation is in flight
    /// or the trigger does not apply.
    ///
    /// # Errors
    ///
    /// Initial-load and refresh failures are returned (and recorded in the
    /// snapshot's error slot). [`Error::Cancelled`] is returned after
    /// [`shutdown`](Self::shutdown).
    pub async fn handle(&self, trigger: Trigger) -> Result<SyncOutcome> {
        match trigger {
            Trigger::Focus => {
                if self.snapshot().lifecycle != Lifecycle::Uninitialized {
                    debug!("History already initialised, ignoring focus");
                    return Ok(SyncOutcome::Skipped);
                }
                self.run(SyncOp::Initial).await
            }
            Trigger::PullToRefresh => self.run(SyncOp::Refresh).await,
            Trigger::ScrollNearEnd => self.run(SyncOp::More).await,
            Trigger::Retry => self.run(SyncOp::Initial).await,
        }
    }

    /// The view gained focus; loads page 1 the first time only.
    pub async fn on_focus(&self) -> Result<SyncOutcome> {
        self.handle(Trigger::Focus).await
    }

    /// Pull-to-refresh.
    pub async fn on_pull_to_refresh(&self) -> Result<SyncOutcome> {
        self.handle(Trigger::PullToRefresh).await
    }

    /// Scrolled near the end of the list.
    pub async fn on_scroll_near_end(&self) -> Result<SyncOutcome> {
        self.handle(Trigger::ScrollNearEnd).await
    }

    /// Re-run the initial load.
    pub async fn retry(&self) -> Result<SyncOutcome> {
        self.handle(Trigger::Retry).await
    }

    fn update<R>(&self, f: impl FnOnce(&mut HistoryStore) -> R) -> R {
        let (result, snapshot) = {
            let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
            let result = f(&mut store);
            (result, Arc::new(store.page().clone()))
        };
        self.snapshot_tx.send_replace(snapshot);
        result
    }

    async fn run(&self, op: SyncOp) -> Result<SyncOutcome> {
        if !self.is_live() {
            return Err(Error::Cancelled);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(?op, "Sync busy, skipping trigger");
            return Ok(SyncOutcome::Skipped);
        }
        let mut guard = InFlight {
            controller: self,
            pending: None,
        };

        let Some(plan) = self.update(|store| store.begin(op)) else {
            return Ok(SyncOutcome::Skipped);
        };
        guard.pending = Some(op);

        debug!(?op, page = plan.page, limit = plan.limit, "Fetching history page");
        let result = self.source.fetch_page(plan.page, plan.limit).await;

        if !self.is_live() {
            warn!(?op, "Controller shut down during fetch, dropping result");
            return Err(Error::Cancelled);
        }

        guard.pending = None;
        self.update(|store| store.complete(op, result))
    }
}
