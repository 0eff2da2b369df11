// Word-frequency clustering.
//
// Every review is tokenized into lowercase words; short words and stop words
// (the NLTK Portuguese and English function-word lists, plus store
// boilerplate like "app") are dropped.
// Each surviving word occurrence counts toward that word's cluster.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use stop_words::{get, LANGUAGE};
use tracing::debug;

use super::cluster::{sort_by_count_desc, ClusterStats, WordCluster};
use super::sentiment::{score_review, NEGATIVE_KEYWORDS, POSITIVE_KEYWORDS};
use crate::reviews::Review;

/// Maximum number of word clusters returned.
pub const MAX_WORD_CLUSTERS: usize = 50;
/// Sample reviews kept per word.
pub const WORD_SAMPLE_SIZE: usize = 5;
/// Words of this many characters or fewer are ignored.
const MIN_WORD_CHARS: usize = 3;

/// Accented letters that survive punctuation stripping.
const ACCENTED: &str = "áàâãéèêíïóôõöúçñ";

/// Review boilerplate and short function words missing from the stock lists.
const EXTRA_STOP_WORDS: &[&str] = &[
    "o", "a", "de", "da", "do", "em", "um", "uma", "os", "as", "dos", "das", "para", "com",
    "por", "é", "que", "não", "e", "no", "na", "se", "mais", "muito", "bem", "mas", "como",
    "quando", "the", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "does", "did",
    "will", "would", "app", "aplicativo", "this", "that", "it", "its",
];

fn stop_words() -> &'static HashSet<String> {
    static STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| {
        let mut set: HashSet<String> = get(LANGUAGE::Portuguese).into_iter().collect();
        set.extend(get(LANGUAGE::English));
        set.extend(EXTRA_STOP_WORDS.iter().map(|w| w.to_string()));
        // Sentiment vocabulary is always countable
        for keyword in POSITIVE_KEYWORDS.iter().chain(NEGATIVE_KEYWORDS) {
            set.remove(*keyword);
        }
        set
    })
}

/// Split review text into countable words.
///
/// Lowercases, strips punctuation (keeping ASCII word characters and
/// Portuguese accented letters), splits on whitespace and drops short words
/// and stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace() || ACCENTED.contains(*c)
        })
        .collect();

    let stops = stop_words();
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_WORD_CHARS && !stops.contains(*w))
        .map(str::to_string)
        .collect()
}

/// Count word occurrences across all reviews, with sentiment per word.
///
/// Sentiment is scored once per review and credited to every word occurrence
/// in it. Returns at most [`MAX_WORD_CLUSTERS`] words, most frequent first;
/// ties keep first-seen order.
pub fn extract_word_clusters(reviews: &[Review]) -> Vec<WordCluster> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stats: Vec<(String, ClusterStats)> = Vec::new();

    for review in reviews {
        let sentiment = score_review(review).sentiment;
        for word in tokenize(&review.text) {
            let slot = *index.entry(word.clone()).or_insert_with(|| {
                stats.push((word, ClusterStats::new(WORD_SAMPLE_SIZE)));
                stats.len() - 1
            });
            stats[slot].1.add(review, sentiment);
        }
    }

    debug!(distinct_words = stats.len(), "Counted review vocabulary");

    let mut clusters: Vec<WordCluster> = stats
        .into_iter()
        .map(|(word, s)| WordCluster {
            word,
            count: s.count,
            sentiment: s.sentiment,
            avg_rating: s.avg_rating(),
            reviews: s.reviews,
        })
        .collect();

    sort_by_count_desc(&mut clusters);
    clusters.truncate(MAX_WORD_CLUSTERS);
    clusters
}
