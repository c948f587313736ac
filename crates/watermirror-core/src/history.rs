//! Paginated, incrementally synchronised reading history.
//!
//! [`HistoryStore`] owns a newest-first list of readings plus the pagination
//! cursor and loading flags. It supports three operations:
//!
//! | Operation | Page fetched | Merge |
//! |-----------|--------------|-------|
//! | initial load | 1 | replace the list |
//! | refresh | 1 | prepend readings newer than the newest held |
//! | load more | `cursor` | append readings older than the oldest held |
//!
//! # Invariants
//!
//! After every operation the list is sorted by timestamp descending and no
//! two entries share a timestamp. The cursor only advances after a
//! successful load-more that appended something.
//!
//! # Two-phase API
//!
//! Each operation is split into [`HistoryStore::begin`], which sets the
//! loading flag and returns the page to fetch, and
//! [`HistoryStore::complete`], which merges the fetch result. A caller that
//! shares the store behind a lock can release it while the fetch is in
//! flight. [`HistoryStore::load_initial`], [`HistoryStore::refresh`] and
//! [`HistoryStore::load_more`] run both phases against a [`ReadingSource`].

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use watermirror_types::Reading;

use crate::error::Result;
use crate::traits::ReadingSource;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Store lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Nothing has been requested yet.
    #[default]
    Uninitialized,
    /// The initial load is in flight.
    Loading,
    /// The initial load has finished, successfully or not.
    Ready,
}

/// Observable state of a [`HistoryStore`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    /// Readings, newest first.
    pub items: Vec<Reading>,
    /// Next page number to request.
    pub cursor: u32,
    /// Whether load-more may find older readings.
    pub has_more: bool,
    pub is_loading_initial: bool,
    pub is_refreshing: bool,
    pub is_loading_more: bool,
    /// Message of the last failed initial load or refresh.
    pub error: Option<String>,
    pub lifecycle: Lifecycle,
}

impl Default for HistoryPage {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: 1,
            has_more: true,
            is_loading_initial: false,
            is_refreshing: false,
            is_loading_more: false,
            error: None,
            lifecycle: Lifecycle::Uninitialized,
        }
    }
}

impl HistoryPage {
    /// Whether any operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.is_loading_initial || self.is_refreshing || self.is_loading_more
    }

    /// Timestamp of the newest reading held.
    pub fn newest(&self) -> Option<OffsetDateTime> {
        self.items.first().map(|r| r.timestamp)
    }

    /// Timestamp of the oldest reading held.
    pub fn oldest(&self) -> Option<OffsetDateTime> {
        self.items.last().map(|r| r.timestamp)
    }
}

/// A history operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    Initial,
    Refresh,
    More,
}

/// The request a started operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub op: SyncOp,
    pub page: u32,
    pub limit: u32,
}

/// Result of a completed (or skipped) operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Initial load replaced the list with this many readings.
    Loaded(usize),
    /// Refresh added this many newer readings.
    Refreshed(usize),
    /// Load-more appended this many older readings.
    Appended(usize),
    /// Load-more reached the end of history. Not an error.
    Exhausted,
    /// Nothing was started: another operation was in flight, or there is
    /// nothing more to load.
    Skipped,
    /// Load-more failed; the failure was logged and state left unchanged.
    MoreFailed,
}

/// Sort newest-first and drop repeated timestamps, keeping the first seen.
fn normalize(items: &mut Vec<Reading>) {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items.dedup_by_key(|r| r.timestamp);
}

/// Paginated history state machine.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    page: HistoryPage,
    page_size: u32,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl HistoryStore {
    /// Create an empty store. A page size of zero is treated as one.
    pub fn new(page_size: u32) -> Self {
        Self {
            page: HistoryPage::default(),
            page_size: page_size.max(1),
        }
    }

    /// Current state.
    pub fn page(&self) -> &HistoryPage {
        &self.page
    }

    /// Readings, newest first.
    pub fn items(&self) -> &[Reading] {
        &self.page.items
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Start an operation.
    ///
    /// Returns `None` when another operation is in flight, or for
    /// [`SyncOp::More`] when there is nothing more to load. Otherwise the
    /// matching loading flag is set and the page to fetch is returned.
    pub fn begin(&mut self, op: SyncOp) -> Option<FetchPlan> {
        if self.page.is_busy() {
            debug!(?op, "History operation already in flight, skipping");
            return None;
        }

        let page = match op {
            SyncOp::Initial => {
                self.page.is_loading_initial = true;
                self.page.lifecycle = Lifecycle::Loading;
                1
            }
            SyncOp::Refresh => {
                self.page.is_refreshing = true;
                1
            }
            SyncOp::More => {
                if !self.page.has_more {
                    debug!("No more history to load");
                    return None;
                }
                self.page.is_loading_more = true;
                self.page.cursor
            }
        };

        Some(FetchPlan {
            op,
            page,
            limit: self.page_size,
        })
    }

    /// Clear the loading flag of an operation without applying any result.
    pub fn abort(&mut self, op: SyncOp) {
        match op {
            SyncOp::Initial => {
                self.page.is_loading_initial = false;
                if self.page.lifecycle == Lifecycle::Loading {
                    self.page.lifecycle = Lifecycle::Ready;
                }
            }
            SyncOp::Refresh => self.page.is_refreshing = false,
            SyncOp::More => self.page.is_loading_more = false,
        }
    }

    /// Apply the result of a fetch started with [`begin`](Self::begin).
    ///
    /// # Errors
    ///
    /// Initial-load and refresh failures are stored in the error slot and
    /// returned. Load-more failures are logged and reported as
    /// [`SyncOutcome::MoreFailed`].
    pub fn complete(&mut self, op: SyncOp, result: Result<Vec<Reading>>) -> Result<SyncOutcome> {
        self.abort(op);

        match op {
            SyncOp::Initial => self.complete_initial(result),
            SyncOp::Refresh => self.complete_refresh(result),
            SyncOp::More => Ok(self.complete_more(result)),
        }
    }

    fn complete_initial(&mut self, result: Result<Vec<Reading>>) -> Result<SyncOutcome> {
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Initial history load failed: {}", e);
                self.page.error = Some(e.to_string());
                return Err(e);
            }
        };

        let raw_count = fetched.len();
        let mut items = fetched;
        normalize(&mut items);

        self.page.items = items;
        self.page.cursor = 2;
        self.page.has_more = raw_count == self.page_size as usize;
        self.page.error = None;

        info!(
            count = self.page.items.len(),
            has_more = self.page.has_more,
            "Loaded initial history page"
        );
        Ok(SyncOutcome::Loaded(self.page.items.len()))
    }

    fn complete_refresh(&mut self, result: Result<Vec<Reading>>) -> Result<SyncOutcome> {
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("History refresh failed: {}", e);
                self.page.error = Some(e.to_string());
                return Err(e);
            }
        };

        let added = match self.page.newest() {
            Some(newest) => {
                let mut merged: Vec<Reading> = fetched
                    .into_iter()
                    .filter(|r| r.timestamp > newest)
                    .collect();
                let before = self.page.items.len();
                merged.extend(self.page.items.iter().copied());
                normalize(&mut merged);
                let added = merged.len() - before;
                self.page.items = merged;
                added
            }
            None => {
                let mut items = fetched;
                normalize(&mut items);
                self.page.items = items;
                self.page.items.len()
            }
        };

        // Page 1 was just re-read, so paging restarts from page 2.
        self.page.cursor = 2;
        self.page.has_more = true;
        self.page.error = None;

        info!(added, total = self.page.items.len(), "Refreshed history");
        Ok(SyncOutcome::Refreshed(added))
    }

    fn complete_more(&mut self, result: Result<Vec<Reading>>) -> SyncOutcome {
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(cursor = self.page.cursor, "Failed to load more history: {}", e);
                return SyncOutcome::MoreFailed;
            }
        };

        if fetched.is_empty() {
            self.page.has_more = false;
            info!(cursor = self.page.cursor, "Reached end of history");
            return SyncOutcome::Exhausted;
        }

        let older: Vec<Reading> = match self.page.oldest() {
            Some(oldest) => fetched
                .into_iter()
                .filter(|r| r.timestamp < oldest)
                .collect(),
            None => fetched,
        };

        if older.is_empty() {
            self.page.has_more = false;
            info!(
                cursor = self.page.cursor,
                "Page held no older readings, end of history"
            );
            return SyncOutcome::Exhausted;
        }

        let before = self.page.items.len();
        self.page.items.extend(older);
        normalize(&mut self.page.items);
        let added = self.page.items.len() - before;
        self.page.cursor += 1;

        info!(
            added,
            total = self.page.items.len(),
            cursor = self.page.cursor,
            "Appended older history"
        );
        SyncOutcome::Appended(added)
    }

    async fn run<S: ReadingSource + ?Sized>(
        &mut self,
        op: SyncOp,
        source: &S,
    ) -> Result<SyncOutcome> {
        let Some(plan) = self.begin(op) else {
            return Ok(SyncOutcome::Skipped);
        };
        debug!(?op, page = plan.page, limit = plan.limit, "Fetching history page");
        let result = source.fetch_page(plan.page, plan.limit).await;
        self.complete(op, result)
    }

    /// Fetch page 1 and replace the list.
    pub async fn load_initial<S: ReadingSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<SyncOutcome> {
        self.run(SyncOp::Initial, source).await
    }

    /// Fetch page 1 and prepend anything newer than the newest reading held.
    pub async fn refresh<S: ReadingSource + ?Sized>(&mut self, source: &S) -> Result<SyncOutcome> {
        self.run(SyncOp::Refresh, source).await
    }

    /// Fetch the page at the cursor and append anything older than the
    /// oldest reading held. Never fails; see [`SyncOutcome::MoreFailed`].
    pub async fn load_more<S: ReadingSource + ?Sized>(&mut self, source: &S) -> SyncOutcome {
        match self.run(SyncOp::More, source).await {
            Ok(outcome) => outcome,
            Err(_) => SyncOutcome::MoreFailed,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn reading(secs: i64) -> Reading {
        let ts = OffsetDateTime::from_unix_timestamp(secs).unwrap_or(OffsetDateTime::UNIX_EPOCH);
        Reading::empty(ts)
    }

    #[derive(Debug, Clone)]
    enum Step {
        Op(u8, Vec<i64>),
        Fail(u8),
    }

    fn op_of(n: u8) -> SyncOp {
        match n % 3 {
            0 => SyncOp::Initial,
            1 => SyncOp::Refresh,
            _ => SyncOp::More,
        }
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (any::<u8>(), prop::collection::vec(0i64..500, 0..8)).prop_map(|(o, v)| Step::Op(o, v)),
            any::<u8>().prop_map(Step::Fail),
        ]
    }

    proptest! {
        #[test]
        fn items_stay_sorted_and_unique(steps in prop::collection::vec(step(), 1..30)) {
            let mut store = HistoryStore::new(4);

            for step in steps {
                let (op, result): (SyncOp, Result<Vec<Reading>>) = match step {
                    Step::Op(o, secs) => (op_of(o), Ok(secs.into_iter().map(reading).collect())),
                    Step::Fail(o) => (op_of(o), Err(crate::error::Error::http(500, "u"))),
                };

                let cursor_before = store.page().cursor;
                let items_before = store.items().to_vec();
                if store.begin(op).is_none() {
                    continue;
                }
                let failed = result.is_err();
                let _ = store.complete(op, result);

                let items = store.items();
                for pair in items.windows(2) {
                    prop_assert!(pair[0].timestamp > pair[1].timestamp);
                }
                prop_assert!(!store.page().is_busy());

                if failed {
                    prop_assert_eq!(store.items(), items_before.as_slice());
                    prop_assert_eq!(store.page().cursor, cursor_before);
                }
                if op == SyncOp::More {
                    prop_assert!(store.page().cursor >= cursor_before);
                    // load-more never drops readings
                    prop_assert!(store.items().len() >= items_before.len());
                }
            }
        }
    }
}
