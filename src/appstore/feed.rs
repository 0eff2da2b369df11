// Wire types for the customer-review RSS feed (JSON flavour).
//
// Every value in this feed is wrapped as `{"label": ...}`. A feed with a
// single review returns `entry` as an object instead of an array, and an
// empty feed omits `entry` entirely.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::reviews::Review;

/// `{"label": "..."}` wrapper used by every feed field.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedAuthor {
    pub name: Label,
}

/// One raw feed entry. Fields are optional because the feed mixes review
/// entries with an occasional app-metadata entry that has no rating.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    pub id: Option<Label>,
    pub author: Option<FeedAuthor>,
    #[serde(rename = "im:rating")]
    pub rating: Option<Label>,
    #[serde(rename = "im:version")]
    pub version: Option<Label>,
    pub content: Option<Label>,
    pub updated: Option<Label>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Debug, Deserialize)]
struct Feed {
    entry: Option<OneOrMany<FeedEntry>>,
}

/// Top-level feed document.
#[derive(Debug, Deserialize)]
pub struct FeedPage {
    feed: Option<Feed>,
}

impl FeedPage {
    /// Raw entries on this page, in feed order.
    pub fn into_entries(self) -> Vec<FeedEntry> {
        match self.feed.and_then(|f| f.entry) {
            Some(OneOrMany::Many(entries)) => entries,
            Some(OneOrMany::One(entry)) => vec![entry],
            None => Vec::new(),
        }
    }
}

impl FeedEntry {
    /// Convert into a review, or `None` when this entry is not a usable
    /// review (no rating, rating outside 1..=5, or unparseable timestamp).
    pub fn to_review(&self) -> Option<Review> {
        let rating: u8 = self.rating.as_ref()?.label.trim().parse().ok()?;
        if !(1..=5).contains(&rating) {
            return None;
        }
        let date = DateTime::parse_from_rfc3339(self.updated.as_ref()?.label.trim())
            .ok()?
            .with_timezone(&Utc);

        Some(Review {
            id: self.id.as_ref().map(|l| l.label.clone()).unwrap_or_default(),
            author: self
                .author
                .as_ref()
                .map(|a| a.name.label.clone())
                .unwrap_or_default(),
            rating,
            text: self
                .content
                .as_ref()
                .map(|l| l.label.clone())
                .unwrap_or_default(),
            date,
            version: self
                .version
                .as_ref()
                .map(|l| l.label.clone())
                .filter(|v| !v.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r#"{
        "author": {"uri": {"label": "https://x"}, "name": {"label": "maria"}, "label": ""},
        "updated": {"label": "2025-03-01T10:15:00-07:00"},
        "im:rating": {"label": "4"},
        "im:version": {"label": "3.2.1"},
        "id": {"label": "11223344"},
        "title": {"label": "Bom"},
        "content": {"label": "Funciona bem", "attributes": {"type": "text"}}
    }"#;

    #[test]
    fn test_entry_to_review() {
        let entry: FeedEntry = serde_json::from_str(ENTRY).unwrap();
        let review = entry.to_review().unwrap();
        assert_eq!(review.id, "11223344");
        assert_eq!(review.author, "maria");
        assert_eq!(review.rating, 4);
        assert_eq!(review.text, "Funciona bem");
        assert_eq!(review.version.as_deref(), Some("3.2.1"));
        assert_eq!(review.date.to_rfc3339(), "2025-03-01T17:15:00+00:00");
    }

    #[test]
    fn test_entry_without_rating_is_not_a_review() {
        let entry: FeedEntry =
            serde_json::from_str(r#"{"id": {"label": "app"}, "updated": {"label": "2025-03-01T10:15:00-07:00"}}"#)
                .unwrap();
        assert!(entry.to_review().is_none());
    }

    #[test]
    fn test_single_entry_object() {
        let json = format!(r#"{{"feed": {{"entry": {ENTRY}}}}}"#);
        let page: FeedPage = serde_json::from_str(&json).unwrap();
        assert_eq!(page.into_entries().len(), 1);
    }

    #[test]
    fn test_missing_entry_is_empty_page() {
        let page: FeedPage = serde_json::from_str(r#"{"feed": {"author": {}}}"#).unwrap();
        assert!(page.into_entries().is_empty());
    }
}
