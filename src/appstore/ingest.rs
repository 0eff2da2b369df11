// Review ingestion: paginated, time-bounded walk of the review feed.
//
// The feed is ordered most-recent-first, so the walk stops as soon as a page
// contains anything older than the one-year cutoff. Failed or empty pages
// are tolerated until two arrive back to back. Pages are fetched strictly
// one after another.

use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::client::{AppInfo, AppStoreClient};
use super::feed::FeedEntry;
use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::reviews::{rating_distribution, RatingDistribution, Review};

/// Hard cap on pages walked per ingestion.
pub const MAX_PAGES: u32 = 10;
/// A page with fewer raw entries than this is the last one.
pub const FEED_PAGE_SIZE: usize = 50;
/// Consecutive failed/empty pages tolerated before giving up.
pub const MAX_CONSECUTIVE_EMPTY_PAGES: u32 = 2;

/// A source of review-feed pages, numbered from 1.
///
/// `AppStoreClient` is the production implementation; tests substitute an
/// in-memory feed.
#[async_trait]
pub trait ReviewFeed: Send + Sync {
    /// Fetch one page of raw entries, most recent first.
    async fn fetch_page(&self, app_id: &str, page: u32) -> Result<Vec<FeedEntry>>;
}

/// Why the page walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Walked all `MAX_PAGES` pages
    PageCap,
    /// Too many failed or empty pages in a row
    EmptyPages,
    /// A page contained reviews older than the cutoff
    ReachedCutoff,
    /// A short page signalled the end of the feed
    LastPage,
}

/// Result of one ingestion run.
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub reviews: Vec<Review>,
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

/// App metadata plus the ingested review set and its rating distribution.
#[derive(Debug, Clone, Serialize)]
pub struct AppDetails {
    pub app: AppInfo,
    pub reviews: Vec<Review>,
    pub distribution: RatingDistribution,
}

/// Earliest review date kept when ingesting at `now`.
pub fn cutoff_for(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(12))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Ingest the last year of reviews for `app_id` and compute their rating
/// distribution.
pub async fn fetch_reviews(
    feed: &dyn ReviewFeed,
    app_id: &str,
    cancel: &CancellationToken,
) -> Result<(Vec<Review>, RatingDistribution)> {
    let ingestion = ingest(feed, app_id, Utc::now(), cancel).await?;
    let distribution = rating_distribution(&ingestion.reviews);
    Ok((ingestion.reviews, distribution))
}

/// Walk the feed relative to an explicit `now`.
///
/// Feed errors never fail the call; they only count toward the
/// consecutive-empty-page limit. Only cancellation returns an error.
pub async fn ingest(
    feed: &dyn ReviewFeed,
    app_id: &str,
    now: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<Ingestion> {
    let cutoff = cutoff_for(now);
    info!(app_id, cutoff = %cutoff.format("%Y-%m-%d"), "Fetching reviews from the last 12 months");

    let mut reviews: Vec<Review> = Vec::new();
    let mut consecutive_empty = 0u32;
    let mut pages_fetched = 0u32;
    let mut stop_reason = StopReason::PageCap;

    for page in 1..=MAX_PAGES {
        cancel.check()?;
        pages_fetched = page;

        let entries = match feed.fetch_page(app_id, page).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(page, error = %e, "Review page failed");
                consecutive_empty += 1;
                if consecutive_empty >= MAX_CONSECUTIVE_EMPTY_PAGES {
                    stop_reason = StopReason::EmptyPages;
                    break;
                }
                continue;
            }
        };

        let parsed: Vec<Review> = entries.iter().filter_map(FeedEntry::to_review).collect();
        if parsed.is_empty() {
            warn!(page, raw_entries = entries.len(), "Review page has no usable entries");
            consecutive_empty += 1;
            if consecutive_empty >= MAX_CONSECUTIVE_EMPTY_PAGES {
                stop_reason = StopReason::EmptyPages;
                break;
            }
            continue;
        }

        let parsed_count = parsed.len();
        let in_window: Vec<Review> = parsed.into_iter().filter(|r| r.date >= cutoff).collect();
        let stale = parsed_count - in_window.len();

        reviews.extend(in_window);
        consecutive_empty = 0;
        info!(
            page,
            kept = parsed_count - stale,
            total = reviews.len(),
            "Ingested review page"
        );

        if stale > 0 {
            info!(page, stale, "Reached reviews older than the cutoff");
            stop_reason = StopReason::ReachedCutoff;
            break;
        }
        if entries.len() < FEED_PAGE_SIZE {
            info!(page, entries = entries.len(), "Short page, end of feed");
            stop_reason = StopReason::LastPage;
            break;
        }
    }

    info!(
        app_id,
        reviews = reviews.len(),
        pages = pages_fetched,
        stop = ?stop_reason,
        "Review ingestion finished"
    );

    Ok(Ingestion {
        reviews,
        pages_fetched,
        stop_reason,
    })
}

/// Look up app metadata and ingest its reviews.
///
/// The store's lifetime aggregate is passed through untouched; the
/// distribution covers only the ingested reviews.
pub async fn fetch_app_details(
    client: &AppStoreClient,
    app_id: &str,
    cancel: &CancellationToken,
) -> Result<AppDetails> {
    let app = client.lookup(app_id).await?;
    let (reviews, distribution) = fetch_reviews(client, app_id, cancel).await?;
    Ok(AppDetails {
        app,
        reviews,
        distribution,
    })
}
