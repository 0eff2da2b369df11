// Unit tests for paginated review ingestion.
//
// A scripted in-memory feed stands in for the App Store; every test pins
// `now` so the one-year cutoff is deterministic.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use reviewscope::appstore::feed::FeedEntry;
use reviewscope::appstore::ingest::{
    cutoff_for, ingest, ReviewFeed, StopReason, FEED_PAGE_SIZE, MAX_PAGES,
};
use reviewscope::cancel::CancellationToken;
use reviewscope::error::{AnalysisError, Result};
use reviewscope::reviews::rating_distribution;

/// What the scripted feed returns for a page.
enum Page {
    Entries(Vec<FeedEntry>),
    Fail,
}

struct ScriptedFeed {
    pages: HashMap<u32, Page>,
    requested: Mutex<Vec<u32>>,
    cancel_after: Option<(u32, CancellationToken)>,
}

impl ScriptedFeed {
    fn new(pages: Vec<(u32, Page)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            requested: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    fn requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewFeed for ScriptedFeed {
    async fn fetch_page(&self, _app_id: &str, page: u32) -> Result<Vec<FeedEntry>> {
        self.requested.lock().unwrap().push(page);
        if let Some((after, token)) = &self.cancel_after {
            if page == *after {
                token.cancel();
            }
        }
        match self.pages.get(&page) {
            Some(Page::Entries(entries)) => Ok(entries.clone()),
            Some(Page::Fail) => Err(AnalysisError::feed_page(page, "HTTP 503")),
            None => Ok(Vec::new()),
        }
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn entry(id: u32, rating: u8, date: DateTime<Utc>) -> FeedEntry {
    serde_json::from_value(json!({
        "id": {"label": id.to_string()},
        "author": {"name": {"label": format!("user{id}")}},
        "im:rating": {"label": rating.to_string()},
        "im:version": {"label": "1.0"},
        "content": {"label": format!("review number {id}")},
        "updated": {"label": date.to_rfc3339()},
    }))
    .unwrap()
}

/// `count` fresh reviews starting at `first_id`, each an hour older than the last.
fn fresh_page(first_id: u32, count: usize) -> Page {
    Page::Entries(
        (0..count as u32)
            .map(|i| {
                let id = first_id + i;
                entry(id, (id % 5 + 1) as u8, now() - Duration::hours(i64::from(id)))
            })
            .collect(),
    )
}

// ============================================================
// Page walk
// ============================================================

#[tokio::test]
async fn short_page_ends_ingestion_before_failing_page() {
    let feed = ScriptedFeed::new(vec![
        (1, fresh_page(1, FEED_PAGE_SIZE)),
        (2, fresh_page(100, 30)),
        (3, Page::Fail),
    ]);

    let result = ingest(&feed, "123", now(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.reviews.len(), FEED_PAGE_SIZE + 30);
    assert_eq!(result.stop_reason, StopReason::LastPage);
    assert_eq!(feed.requested(), vec![1, 2]);
}

#[tokio::test]
async fn two_consecutive_failures_stop_ingestion() {
    let feed = ScriptedFeed::new(vec![
        (1, fresh_page(1, FEED_PAGE_SIZE)),
        (2, Page::Fail),
        (3, Page::Fail),
        (4, fresh_page(200, FEED_PAGE_SIZE)),
    ]);

    let result = ingest(&feed, "123", now(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.reviews.len(), FEED_PAGE_SIZE);
    assert_eq!(result.stop_reason, StopReason::EmptyPages);
    assert_eq!(feed.requested(), vec![1, 2, 3]);
}

#[tokio::test]
async fn single_failure_is_tolerated() {
    let feed = ScriptedFeed::new(vec![
        (1, Page::Fail),
        (2, fresh_page(1, FEED_PAGE_SIZE)),
        (3, fresh_page(100, 10)),
    ]);

    let result = ingest(&feed, "123", now(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.reviews.len(), FEED_PAGE_SIZE + 10);
    assert_eq!(feed.requested(), vec![1, 2, 3]);
}

#[tokio::test]
async fn entries_without_rating_count_as_empty_page() {
    let metadata: FeedEntry = serde_json::from_value(json!({
        "id": {"label": "app-entry"},
        "updated": {"label": now().to_rfc3339()},
    }))
    .unwrap();
    let feed = ScriptedFeed::new(vec![
        (1, Page::Entries(vec![metadata.clone()])),
        (2, Page::Entries(vec![metadata])),
        (3, fresh_page(1, 5)),
    ]);

    let result = ingest(&feed, "123", now(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.reviews.is_empty());
    assert_eq!(result.stop_reason, StopReason::EmptyPages);
    assert_eq!(feed.requested(), vec![1, 2]);
}

#[tokio::test]
async fn walk_stops_at_page_cap() {
    let pages = (1..=MAX_PAGES + 2)
        .map(|p| (p, fresh_page(p * 100, FEED_PAGE_SIZE)))
        .collect();
    let feed = ScriptedFeed::new(pages);

    let result = ingest(&feed, "123", now(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.pages_fetched, MAX_PAGES);
    assert_eq!(result.stop_reason, StopReason::PageCap);
    assert_eq!(feed.requested().len(), MAX_PAGES as usize);
}

// ============================================================
// One-year cutoff
// ============================================================

#[tokio::test]
async fn stale_entry_stops_after_its_page() {
    let mut entries: Vec<FeedEntry> = (1..=FEED_PAGE_SIZE as u32 - 1)
        .map(|id| entry(id, 4, now() - Duration::days(i64::from(id))))
        .collect();
    entries.push(entry(999, 1, now() - Duration::days(400)));

    let feed = ScriptedFeed::new(vec![
        (1, Page::Entries(entries)),
        (2, fresh_page(1000, FEED_PAGE_SIZE)),
    ]);

    let result = ingest(&feed, "123", now(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.reviews.len(), FEED_PAGE_SIZE - 1);
    assert_eq!(result.stop_reason, StopReason::ReachedCutoff);
    assert_eq!(feed.requested(), vec![1]);
}

#[tokio::test]
async fn no_review_older_than_cutoff() {
    // Page 1 is all recent, page 2 straddles the cutoff
    let page2 = (0..FEED_PAGE_SIZE as u32)
        .map(|i| entry(500 + i, 3, now() - Duration::days(350 + i64::from(i))))
        .collect();
    let feed = ScriptedFeed::new(vec![
        (1, fresh_page(0, FEED_PAGE_SIZE)),
        (2, Page::Entries(page2)),
    ]);

    let result = ingest(&feed, "123", now(), &CancellationToken::new())
        .await
        .unwrap();

    let cutoff = cutoff_for(now());
    assert!(result.reviews.iter().all(|r| r.date >= cutoff));
    assert!(result.reviews.len() > FEED_PAGE_SIZE);
    assert_eq!(result.stop_reason, StopReason::ReachedCutoff);
}

#[tokio::test]
async fn distribution_matches_ingested_reviews() {
    let feed = ScriptedFeed::new(vec![(1, fresh_page(1, 23))]);
    let result = ingest(&feed, "123", now(), &CancellationToken::new())
        .await
        .unwrap();

    let distribution = rating_distribution(&result.reviews);
    assert_eq!(distribution.len(), 5);
    let total: usize = distribution.iter().map(|s| s.count).sum();
    assert_eq!(total, result.reviews.len());
}

// ============================================================
// Cancellation
// ============================================================

#[tokio::test]
async fn cancelled_before_start_fetches_nothing() {
    let feed = ScriptedFeed::new(vec![(1, fresh_page(1, FEED_PAGE_SIZE))]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = ingest(&feed, "123", now(), &cancel).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Cancelled));
    assert!(feed.requested().is_empty());
}

#[tokio::test]
async fn cancellation_observed_at_next_page_boundary() {
    let cancel = CancellationToken::new();
    let mut feed = ScriptedFeed::new(vec![
        (1, fresh_page(1, FEED_PAGE_SIZE)),
        (2, fresh_page(100, FEED_PAGE_SIZE)),
        (3, fresh_page(200, FEED_PAGE_SIZE)),
    ]);
    feed.cancel_after = Some((2, cancel.clone()));

    let err = ingest(&feed, "123", now(), &cancel).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Cancelled));
    assert_eq!(feed.requested(), vec![1, 2]);
}
