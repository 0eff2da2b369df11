// Recurring-phrase clustering.
//
// Reviews are split into sentences; identical sentences (ignoring case) from
// different reviews, or repeated inside one review, form a phrase cluster.
// Only phrases seen at least twice are reported.

use std::collections::HashMap;

use super::cluster::{sort_by_count_desc, PhraseCluster, SentimentDistribution};
use super::sentiment::score_review;
use crate::reviews::Review;

/// Maximum number of phrase clusters returned.
pub const MAX_PHRASE_CLUSTERS: usize = 30;
/// Sample reviews kept per phrase.
pub const PHRASE_SAMPLE_SIZE: usize = 3;
/// Minimum occurrences for a phrase to be reported.
pub const MIN_PHRASE_OCCURRENCES: usize = 2;

const MIN_SENTENCE_CHARS: usize = 10;
const MAX_SENTENCE_CHARS: usize = 100;

/// Split text into trimmed sentences of 10 to 99 characters.
pub fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| (MIN_SENTENCE_CHARS..MAX_SENTENCE_CHARS).contains(&s.chars().count()))
}

/// Find sentences that recur across the review set.
///
/// The display phrase keeps the casing of its first occurrence. The average
/// rating is maintained as a running mean as occurrences arrive.
pub fn extract_phrase_clusters(reviews: &[Review]) -> Vec<PhraseCluster> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut clusters: Vec<PhraseCluster> = Vec::new();

    for review in reviews {
        let sentiment = score_review(review).sentiment;

        for sentence in sentences(&review.text) {
            let slot = *index.entry(sentence.to_lowercase()).or_insert_with(|| {
                clusters.push(PhraseCluster {
                    phrase: sentence.to_string(),
                    count: 0,
                    sentiment: SentimentDistribution::default(),
                    avg_rating: 0.0,
                    reviews: Vec::new(),
                });
                clusters.len() - 1
            });

            let cluster = &mut clusters[slot];
            cluster.count += 1;
            cluster.sentiment.record(sentiment);
            let n = cluster.count as f64;
            cluster.avg_rating = (cluster.avg_rating * (n - 1.0) + f64::from(review.rating)) / n;
            if cluster.reviews.len() < PHRASE_SAMPLE_SIZE {
                cluster.reviews.push(review.clone());
            }
        }
    }

    clusters.retain(|c| c.count >= MIN_PHRASE_OCCURRENCES);
    sort_by_count_desc(&mut clusters);
    clusters.truncate(MAX_PHRASE_CLUSTERS);
    clusters
}
