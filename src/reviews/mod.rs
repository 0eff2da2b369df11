// Review data model: the canonical record every analysis consumes.
//
// Reviews are produced once by ingestion and never mutated afterwards.
// The rating distribution is derived from the ingested set only.

pub mod filters;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single app-store review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub author: String,
    /// Star rating, 1 to 5
    pub rating: u8,
    pub text: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Number of ingested reviews with a given star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarCount {
    pub stars: u8,
    pub count: usize,
}

/// Ordered 1..=5 star counts over the ingested review set.
pub type RatingDistribution = Vec<StarCount>;

/// Count reviews per star rating, always returning exactly five buckets.
///
/// Ratings outside 1..=5 are not counted anywhere.
pub fn rating_distribution(reviews: &[Review]) -> RatingDistribution {
    (1..=5u8)
        .map(|stars| StarCount {
            stars,
            count: reviews.iter().filter(|r| r.rating == stars).count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8) -> Review {
        Review {
            id: format!("r{rating}"),
            author: "tester".to_string(),
            rating,
            text: "texto".to_string(),
            date: Utc::now(),
            version: None,
        }
    }

    #[test]
    fn test_distribution_covers_all_stars() {
        let reviews = vec![review(5), review(5), review(1), review(3)];
        let dist = rating_distribution(&reviews);
        assert_eq!(dist.len(), 5);
        assert_eq!(dist[0], StarCount { stars: 1, count: 1 });
        assert_eq!(dist[1], StarCount { stars: 2, count: 0 });
        assert_eq!(dist[2], StarCount { stars: 3, count: 1 });
        assert_eq!(dist[4], StarCount { stars: 5, count: 2 });
        let total: usize = dist.iter().map(|s| s.count).sum();
        assert_eq!(total, reviews.len());
    }

    #[test]
    fn test_distribution_empty() {
        let dist = rating_distribution(&[]);
        assert!(dist.iter().all(|s| s.count == 0));
    }

    #[test]
    fn test_review_wire_shape_omits_missing_version() {
        let json = serde_json::to_value(review(4)).unwrap();
        assert!(json.get("version").is_none());
        assert_eq!(json["rating"], 4);
    }
}
