// App Store client: unauthenticated lookup and customer-review RSS over HTTP.
//
// Both endpoints are public. Every request carries the configured timeout;
// a timeout surfaces as a network error like any other transport failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::feed::{FeedEntry, FeedPage};
use super::ingest::ReviewFeed;
use crate::error::{AnalysisError, Result};

/// Default iTunes endpoint for lookup and review feeds.
pub const DEFAULT_APPSTORE_BASE_URL: &str = "https://itunes.apple.com";

/// Default storefront country.
pub const DEFAULT_COUNTRY: &str = "br";

/// App metadata, including the store's lifetime rating aggregate.
///
/// `average_rating` and `total_reviews` come straight from the store and are
/// unrelated to the (time-bounded) set of reviews we ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    pub developer: String,
    pub icon: String,
    pub store: String,
    pub store_url: String,
    pub average_rating: f64,
    pub total_reviews: u64,
}

/// Thin reqwest wrapper for the iTunes lookup and RSS endpoints.
pub struct AppStoreClient {
    client: reqwest::Client,
    base_url: String,
    country: String,
}

impl AppStoreClient {
    /// Create a client for the given endpoint and storefront country.
    pub fn new(base_url: &str, country: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("reviewscope/0.1 (review-analytics)")
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            country: country.to_string(),
        })
    }

    /// Look up an app by its numeric store id.
    pub async fn lookup(&self, app_id: &str) -> Result<AppInfo> {
        let url = format!("{}/lookup", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("id", app_id), ("country", self.country.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::network(format!(
                "App Store lookup returned {status}: {body}"
            )));
        }

        let lookup: LookupResponse = response.json().await?;
        let app = lookup
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AnalysisError::NotFound {
                app_id: app_id.to_string(),
            })?;

        Ok(app.into_app_info())
    }

    fn feed_url(&self, app_id: &str, page: u32) -> String {
        format!(
            "{}/{}/rss/customerreviews/page={}/id={}/sortby=mostrecent/json",
            self.base_url, self.country, page, app_id
        )
    }
}

#[async_trait]
impl ReviewFeed for AppStoreClient {
    async fn fetch_page(&self, app_id: &str, page: u32) -> Result<Vec<FeedEntry>> {
        let url = self.feed_url(app_id, page);
        debug!(page, app_id, "Fetching review feed page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnalysisError::feed_page(page, e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::feed_page(
                page,
                format!("feed returned {}", response.status()),
            ));
        }

        let body: FeedPage = response
            .json()
            .await
            .map_err(|e| AnalysisError::feed_page(page, format!("undecodable page: {e}")))?;

        Ok(body.into_entries())
    }
}

// -- Serde types for the lookup endpoint --

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResult {
    track_id: u64,
    track_name: String,
    #[serde(default)]
    artist_name: Option<String>,
    #[serde(default)]
    artwork_url512: Option<String>,
    #[serde(default)]
    artwork_url100: Option<String>,
    #[serde(default)]
    track_view_url: Option<String>,
    #[serde(default)]
    average_user_rating: Option<f64>,
    #[serde(default)]
    user_rating_count: Option<u64>,
}

impl LookupResult {
    fn into_app_info(self) -> AppInfo {
        AppInfo {
            id: self.track_id.to_string(),
            name: self.track_name,
            developer: self.artist_name.unwrap_or_else(|| "Unknown".to_string()),
            icon: self
                .artwork_url512
                .or(self.artwork_url100)
                .unwrap_or_default(),
            store: "App Store".to_string(),
            store_url: self.track_view_url.unwrap_or_default(),
            average_rating: self.average_user_rating.unwrap_or(0.0),
            total_reviews: self.user_rating_count.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_url_shape() {
        let client =
            AppStoreClient::new("https://itunes.apple.com/", "br", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.feed_url("389801252", 3),
            "https://itunes.apple.com/br/rss/customerreviews/page=3/id=389801252/sortby=mostrecent/json"
        );
    }

    #[test]
    fn test_lookup_result_mapping() {
        let json = r#"{"resultCount": 1, "results": [{
            "trackId": 389801252,
            "trackName": "Instagram",
            "artistName": "Instagram, Inc.",
            "artworkUrl100": "https://img/100.png",
            "trackViewUrl": "https://apps.apple.com/br/app/id389801252",
            "averageUserRating": 4.68,
            "userRatingCount": 250000
        }]}"#;
        let lookup: LookupResponse = serde_json::from_str(json).unwrap();
        let app = lookup.results.into_iter().next().unwrap().into_app_info();
        assert_eq!(app.id, "389801252");
        assert_eq!(app.icon, "https://img/100.png");
        assert_eq!(app.total_reviews, 250000);
        assert!((app.average_rating - 4.68).abs() < 1e-9);
        assert_eq!(app.store, "App Store");
    }
}
