// Rating-plus-lexicon sentiment heuristic.
//
// The star rating carries most of the signal (±0.7); a bilingual keyword
// lexicon nudges the score by at most ±0.3. With ratings 1, 2, 4 and 5 the
// label is therefore fixed by the rating alone, and only 3-star reviews are
// decided by their wording.

use serde::{Deserialize, Serialize};

use crate::reviews::Review;

/// Coarse sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label plus the underlying score in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub score: f64,
}

pub(crate) const POSITIVE_KEYWORDS: &[&str] = &[
    "love", "great", "awesome", "excellent", "perfect", "amazing", "best", "fantastic",
    "wonderful", "good", "nice", "helpful", "easy", "beautiful", "amo", "ótimo", "excelente",
    "perfeito", "maravilhoso", "melhor", "bom", "incrível", "fantástico", "útil", "fácil",
    "lindo", "adorei", "amei",
];

pub(crate) const NEGATIVE_KEYWORDS: &[&str] = &[
    "hate", "bad", "terrible", "awful", "horrible", "worst", "poor", "crash", "bug", "broken",
    "slow", "useless", "waste", "disappointed", "frustrated", "odeio", "ruim", "péssimo",
    "horrível", "pior", "lixo", "travando", "quebrado", "lento", "inútil", "decepcionado",
    "frustrado",
];

const RATING_WEIGHT: f64 = 0.7;
const KEYWORD_CAP: f64 = 0.3;
const LABEL_THRESHOLD: f64 = 0.2;

/// Score a review's text and star rating.
///
/// Each lexicon term found anywhere in the lowercased text counts once.
pub fn score(text: &str, rating: u8) -> SentimentResult {
    let lower = text.to_lowercase();

    let positive = POSITIVE_KEYWORDS.iter().filter(|k| lower.contains(*k)).count();
    let negative = NEGATIVE_KEYWORDS.iter().filter(|k| lower.contains(*k)).count();

    let base = match rating {
        r if r >= 4 => RATING_WEIGHT,
        3 => 0.0,
        _ => -RATING_WEIGHT,
    };
    let keyword_score =
        ((positive as f64 - negative as f64) / 10.0).clamp(-KEYWORD_CAP, KEYWORD_CAP);
    let score = base + keyword_score;

    let sentiment = if score > LABEL_THRESHOLD {
        Sentiment::Positive
    } else if score < -LABEL_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    SentimentResult { sentiment, score }
}

/// Convenience wrapper for a whole review.
pub fn score_review(review: &Review) -> SentimentResult {
    score(&review.text, review.rating)
}

/// Label counts and mean score over a review set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSummary {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub average_score: f64,
}

/// Summarize sentiment across all reviews. An empty set yields all zeros.
pub fn overall_sentiment(reviews: &[Review]) -> SentimentSummary {
    let mut summary = SentimentSummary {
        positive: 0,
        neutral: 0,
        negative: 0,
        average_score: 0.0,
    };
    if reviews.is_empty() {
        return summary;
    }

    let mut total = 0.0;
    for review in reviews {
        let result = score_review(review);
        total += result.score;
        match result.sentiment {
            Sentiment::Positive => summary.positive += 1,
            Sentiment::Neutral => summary.neutral += 1,
            Sentiment::Negative => summary.negative += 1,
        }
    }
    summary.average_score = total / reviews.len() as f64;
    summary
}
