// Cluster shapes shared by every analysis view.
//
// Word, topic, phrase and theme clusters all carry a count, a sentiment
// breakdown that sums to that count, an average rating over every assigned
// review, and a bounded sample of the reviews themselves.

use serde::{Deserialize, Serialize};

use super::sentiment::Sentiment;
use crate::reviews::Review;

/// Positive / neutral / negative counts for one cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentDistribution {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Running totals for one cluster while reviews are being assigned.
///
/// Keeps the count, sentiment and rating sum over every review added, but
/// only the first `sample_cap` reviews themselves.
#[derive(Debug, Clone)]
pub(crate) struct ClusterStats {
    pub count: usize,
    pub sentiment: SentimentDistribution,
    total_rating: u64,
    pub reviews: Vec<Review>,
    sample_cap: usize,
}

impl ClusterStats {
    pub fn new(sample_cap: usize) -> Self {
        Self {
            count: 0,
            sentiment: SentimentDistribution::default(),
            total_rating: 0,
            reviews: Vec::new(),
            sample_cap,
        }
    }

    pub fn add(&mut self, review: &Review, sentiment: Sentiment) {
        self.count += 1;
        self.sentiment.record(sentiment);
        self.total_rating += u64::from(review.rating);
        if self.reviews.len() < self.sample_cap {
            self.reviews.push(review.clone());
        }
    }

    pub fn avg_rating(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_rating as f64 / self.count as f64
        }
    }
}

/// Read-only view over any cluster kind, used for ranking and display.
pub trait ClusterView {
    /// The word, topic, phrase or theme name.
    fn label(&self) -> &str;
    fn count(&self) -> usize;
    fn sentiment(&self) -> &SentimentDistribution;
    fn avg_rating(&self) -> f64;
    fn reviews(&self) -> &[Review];
}

/// Reviews sharing a frequent word.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCluster {
    pub word: String,
    pub count: usize,
    pub sentiment: SentimentDistribution,
    pub avg_rating: f64,
    pub reviews: Vec<Review>,
}

/// Reviews matching one entry of the fixed topic taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCluster {
    pub topic: String,
    pub keywords: Vec<String>,
    pub count: usize,
    pub sentiment: SentimentDistribution,
    pub avg_rating: f64,
    pub reviews: Vec<Review>,
}

/// A sentence that recurs across reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseCluster {
    pub phrase: String,
    pub count: usize,
    pub sentiment: SentimentDistribution,
    pub avg_rating: f64,
    pub reviews: Vec<Review>,
}

/// Reviews the AI provider assigned to one discovered theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeCluster {
    pub theme: String,
    pub description: String,
    pub count: usize,
    pub sentiment: SentimentDistribution,
    pub avg_rating: f64,
    pub reviews: Vec<Review>,
}

macro_rules! impl_cluster_view {
    ($ty:ty, $label:ident) => {
        impl ClusterView for $ty {
            fn label(&self) -> &str {
                &self.$label
            }
            fn count(&self) -> usize {
                self.count
            }
            fn sentiment(&self) -> &SentimentDistribution {
                &self.sentiment
            }
            fn avg_rating(&self) -> f64 {
                self.avg_rating
            }
            fn reviews(&self) -> &[Review] {
                &self.reviews
            }
        }
    };
}

impl_cluster_view!(WordCluster, word);
impl_cluster_view!(TopicCluster, topic);
impl_cluster_view!(PhraseCluster, phrase);
impl_cluster_view!(ThemeCluster, theme);

/// Sort clusters by count, largest first. Stable, so ties keep first-seen order.
pub fn sort_by_count_desc<C: ClusterView>(clusters: &mut [C]) {
    clusters.sort_by(|a, b| b.count().cmp(&a.count()));
}
