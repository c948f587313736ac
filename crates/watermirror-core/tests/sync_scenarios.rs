//! End-to-end history synchronisation scenarios driven through MockSource.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;

use watermirror_core::{
    HistoryPage, Lifecycle, MockRequest, MockSource, Reading, SyncController, SyncOutcome,
};

fn at(secs: i64) -> Reading {
    let ts = OffsetDateTime::from_unix_timestamp(secs).unwrap();
    Reading::builder(ts).score(secs as f64).build()
}

fn stamps(page: &HistoryPage) -> Vec<i64> {
    page.items
        .iter()
        .map(|r| r.timestamp.unix_timestamp())
        .collect()
}

fn assert_ordered_and_unique(page: &HistoryPage) {
    for pair in page.items.windows(2) {
        assert!(
            pair[0].timestamp > pair[1].timestamp,
            "items out of order or duplicated: {:?}",
            stamps(page)
        );
    }
}

#[tokio::test]
async fn scenario_ten_then_three_then_nothing() {
    let source = Arc::new(MockSource::with_readings((1..=13).map(at).collect()));
    let controller = SyncController::new(Arc::clone(&source), 10);

    controller.on_focus().await.unwrap();
    let snap = controller.snapshot();
    assert_eq!(snap.items.len(), 10);
    assert_eq!(snap.cursor, 2);
    assert!(snap.has_more);

    controller.on_scroll_near_end().await.unwrap();
    let snap = controller.snapshot();
    assert_eq!(snap.items.len(), 13);
    assert_eq!(snap.cursor, 3);
    assert!(snap.has_more);

    assert_eq!(
        controller.on_scroll_near_end().await.unwrap(),
        SyncOutcome::Exhausted
    );
    let snap = controller.snapshot();
    assert_eq!(snap.cursor, 3);
    assert!(!snap.has_more);
    assert_ordered_and_unique(&snap);

    // Idle once exhausted: no further fetch.
    let before = source.fetch_count();
    assert_eq!(
        controller.on_scroll_near_end().await.unwrap(),
        SyncOutcome::Skipped
    );
    assert_eq!(source.fetch_count(), before);
}

#[tokio::test]
async fn scenario_refresh_merges_newer_readings() {
    let source = Arc::new(MockSource::with_readings(vec![at(100), at(90), at(80)]));
    let controller = SyncController::new(Arc::clone(&source), 3);

    controller.on_focus().await.unwrap();
    assert_eq!(stamps(&controller.snapshot()), vec![100, 90, 80]);

    source.add_readings(vec![at(110)]).await;
    assert_eq!(
        controller.on_pull_to_refresh().await.unwrap(),
        SyncOutcome::Refreshed(1)
    );

    let snap = controller.snapshot();
    assert_eq!(stamps(&snap), vec![110, 100, 90, 80]);
    assert_eq!(snap.cursor, 2);
    assert!(snap.has_more);
}

#[tokio::test]
async fn scenario_initial_failure_then_retry() {
    let source = Arc::new(MockSource::with_readings((1..=4).map(at).collect()));
    source.set_fail_status(Some(500));
    let controller = SyncController::new(Arc::clone(&source), 10);

    let err = controller.on_focus().await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let snap = controller.snapshot();
    assert!(snap.error.as_deref().unwrap().contains("500"));
    assert!(snap.items.is_empty());
    assert!(!snap.is_loading_initial);
    assert_eq!(snap.lifecycle, Lifecycle::Ready);

    source.set_fail_status(None);
    assert_eq!(controller.retry().await.unwrap(), SyncOutcome::Loaded(4));
    assert_eq!(controller.snapshot().error, None);
    assert_eq!(
        source.requests().await,
        vec![
            MockRequest::Page { page: 1, limit: 10 },
            MockRequest::Page { page: 1, limit: 10 },
        ]
    );
}

#[tokio::test]
async fn scenario_load_more_failure_is_silent() {
    let source = Arc::new(MockSource::with_readings((1..=30).map(at).collect()));
    let controller = SyncController::new(Arc::clone(&source), 10);
    controller.on_focus().await.unwrap();

    source.set_transient_failures(1);
    assert_eq!(
        controller.on_scroll_near_end().await.unwrap(),
        SyncOutcome::MoreFailed
    );
    let snap = controller.snapshot();
    assert_eq!(snap.error, None);
    assert_eq!(snap.cursor, 2);
    assert_eq!(snap.items.len(), 10);

    assert_eq!(
        controller.on_scroll_near_end().await.unwrap(),
        SyncOutcome::Appended(10)
    );
}

#[tokio::test(start_paused = true)]
async fn scenario_concurrent_triggers_keep_invariants() {
    let source = Arc::new(MockSource::with_readings((1..=50).map(at).collect()));
    source.set_latency(Duration::from_millis(20));
    let controller = Arc::new(SyncController::new(Arc::clone(&source), 10));
    let mut rx = controller.subscribe();

    let watcher = tokio::spawn(async move {
        let mut seen = 0usize;
        while rx.changed().await.is_ok() {
            let snap = rx.borrow_and_update().clone();
            assert_ordered_and_unique(&snap);
            seen += 1;
        }
        seen
    });

    controller.on_focus().await.unwrap();
    for round in 0..10 {
        let a = Arc::clone(&controller);
        let b = Arc::clone(&controller);
        let (x, y) = tokio::join!(
            tokio::spawn(async move { a.on_scroll_near_end().await }),
            tokio::spawn(async move { b.on_pull_to_refresh().await }),
        );
        let outcomes = [x.unwrap().unwrap(), y.unwrap().unwrap()];
        assert!(
            outcomes.contains(&SyncOutcome::Skipped),
            "round {round}: both triggers ran: {outcomes:?}"
        );
        if round % 3 == 0 {
            source.add_readings(vec![at(1000 + round)]).await;
        }
    }

    let snap = controller.snapshot();
    assert_ordered_and_unique(&snap);
    assert!(!snap.is_busy());

    drop(controller);
    let seen = watcher.await.unwrap();
    assert!(seen > 0);
}
