// Theme discovery engine: a small state machine over four stages:
//
//   Sampling -> Discovery -> Categorizing(batch i) ... -> Aggregating -> Done
//
// Each stage hands a typed value to the next. Discovery errors abort the
// run. A categorization batch that fails for any reason sends all of its
// reviews to the "Outros" bucket and the machine moves on, so every input
// review ends up in exactly one bucket.

use std::collections::HashMap;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::json::parse_model_json;
use super::prompts::{
    categorization_request, discovery_request, DiscoveredTheme, FALLBACK_DESCRIPTION,
    FALLBACK_THEME,
};
use super::provider::{select_provider, CompletionProvider};
use crate::analysis::cluster::{sort_by_count_desc, ClusterStats, ThemeCluster};
use crate::analysis::sentiment::Sentiment;
use crate::cancel::CancellationToken;
use crate::config::ProviderConfig;
use crate::error::{AnalysisError, Result};
use crate::reviews::Review;

/// Reviews sampled for theme discovery.
pub const DISCOVERY_SAMPLE_SIZE: usize = 100;
/// Reviews per categorization call.
pub const CATEGORIZATION_BATCH_SIZE: usize = 15;

const EXPECTED_THEMES: std::ops::RangeInclusive<usize> = 5..=12;

/// Select a provider from `config` and run a full theme analysis.
///
/// Fails with `ProviderNotConfigured` before any network call when no
/// credential is set.
pub async fn discover_themes<R: Rng + ?Sized>(
    reviews: &[Review],
    config: &ProviderConfig,
    rng: &mut R,
    cancel: &CancellationToken,
) -> Result<Vec<ThemeCluster>> {
    let provider = select_provider(config)?;
    let report = ThemeAnalysis::new(reviews, provider.as_ref(), cancel)
        .run(rng)
        .await?;
    Ok(report.clusters)
}

/// Where a run currently is, with the data that stage produced.
pub enum Stage<'a> {
    Sampling,
    Discovery { sample: Vec<&'a Review> },
    Categorizing { buckets: ThemeBuckets, next_batch: usize },
    Aggregating { buckets: ThemeBuckets },
    Done(Vec<ThemeCluster>),
}

/// Outcome of one categorization batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Categorized {
        /// Reviews the answer never mentioned (placed in "Outros")
        unmentioned: usize,
        /// Indices outside the batch (ignored)
        out_of_range: usize,
    },
    /// The whole batch went to "Outros"
    Fallback { reason: String },
}

/// Final result of a run.
#[derive(Debug, Clone)]
pub struct ThemeReport {
    pub discovered: Vec<DiscoveredTheme>,
    /// Non-empty buckets, largest first
    pub clusters: Vec<ThemeCluster>,
    pub batches: Vec<BatchOutcome>,
}

impl ThemeReport {
    pub fn fallback_batches(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| matches!(b, BatchOutcome::Fallback { .. }))
            .count()
    }
}

/// One theme analysis over a fixed review set.
pub struct ThemeAnalysis<'a> {
    reviews: &'a [Review],
    provider: &'a dyn CompletionProvider,
    cancel: &'a CancellationToken,
    discovered: Vec<DiscoveredTheme>,
    batches: Vec<BatchOutcome>,
}

impl<'a> ThemeAnalysis<'a> {
    pub fn new(
        reviews: &'a [Review],
        provider: &'a dyn CompletionProvider,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            reviews,
            provider,
            cancel,
            discovered: Vec::new(),
            batches: Vec::new(),
        }
    }

    fn batch_count(&self) -> usize {
        self.reviews.len().div_ceil(CATEGORIZATION_BATCH_SIZE)
    }

    /// Drive the machine to completion.
    pub async fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<ThemeReport> {
        if self.reviews.is_empty() {
            info!("No reviews to analyze, skipping theme discovery");
            return Ok(ThemeReport {
                discovered: Vec::new(),
                clusters: Vec::new(),
                batches: Vec::new(),
            });
        }

        let mut stage = Stage::Sampling;
        loop {
            stage = match stage {
                Stage::Done(clusters) => {
                    info!(themes = clusters.len(), "Theme analysis complete");
                    return Ok(ThemeReport {
                        discovered: self.discovered,
                        clusters,
                        batches: self.batches,
                    });
                }
                other => self.advance(other, rng).await?,
            };
        }
    }

    /// Perform one transition.
    pub async fn advance<R: Rng + ?Sized>(
        &mut self,
        stage: Stage<'a>,
        rng: &mut R,
    ) -> Result<Stage<'a>> {
        match stage {
            Stage::Sampling => {
                let sample = sample_reviews(self.reviews, rng);
                info!(
                    sampled = sample.len(),
                    total = self.reviews.len(),
                    provider = self.provider.name(),
                    "Sampled reviews for theme discovery"
                );
                Ok(Stage::Discovery { sample })
            }
            Stage::Discovery { sample } => {
                self.cancel.check()?;
                let themes = self.discover(&sample).await?;
                self.discovered = themes.clone();
                Ok(Stage::Categorizing {
                    buckets: ThemeBuckets::new(themes),
                    next_batch: 0,
                })
            }
            Stage::Categorizing {
                mut buckets,
                next_batch,
            } => {
                if next_batch >= self.batch_count() {
                    return Ok(Stage::Aggregating { buckets });
                }
                self.cancel.check()?;
                let start = next_batch * CATEGORIZATION_BATCH_SIZE;
                let end = (start + CATEGORIZATION_BATCH_SIZE).min(self.reviews.len());
                let outcome = self
                    .categorize_batch(&mut buckets, next_batch + 1, &self.reviews[start..end])
                    .await;
                self.batches.push(outcome);
                Ok(Stage::Categorizing {
                    buckets,
                    next_batch: next_batch + 1,
                })
            }
            Stage::Aggregating { buckets } => {
                debug_assert_eq!(buckets.total(), self.reviews.len());
                Ok(Stage::Done(buckets.into_clusters()))
            }
            Stage::Done(clusters) => Ok(Stage::Done(clusters)),
        }
    }

    async fn discover(&self, sample: &[&Review]) -> Result<Vec<DiscoveredTheme>> {
        let request = discovery_request(sample);
        let text = self.provider.complete(&request).await.map_err(|e| {
            warn!(provider = self.provider.name(), error = %e, "Theme discovery call failed");
            e
        })?;
        let themes = parse_discovered_themes(&text)?;

        let names: Vec<&str> = themes.iter().map(|t| t.name.as_str()).collect();
        info!(count = themes.len(), themes = ?names, "Discovered themes");
        if !EXPECTED_THEMES.contains(&themes.len()) {
            warn!(count = themes.len(), "Provider returned an unusual number of themes");
        }
        Ok(themes)
    }

    async fn categorize_batch(
        &self,
        buckets: &mut ThemeBuckets,
        batch_no: usize,
        batch: &[Review],
    ) -> BatchOutcome {
        let total = self.batch_count();
        let request = categorization_request(&buckets.discovered, batch);

        let parsed = match self.provider.complete(&request).await {
            Ok(text) => parse_categorizations(&text),
            Err(e) => Err(e),
        };
        let categorizations = match parsed {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    batch = batch_no,
                    of = total,
                    error = %e,
                    "Categorization failed, assigning batch to {FALLBACK_THEME}"
                );
                for review in batch {
                    buckets.assign(buckets.fallback, review);
                }
                return BatchOutcome::Fallback {
                    reason: e.to_string(),
                };
            }
        };

        let mut placed = vec![false; batch.len()];
        let mut out_of_range = 0;
        for cat in categorizations {
            let Some((index, review)) = cat.index.and_then(|i| batch.get(i).map(|r| (i, r))) else {
                warn!(batch = batch_no, index = %cat.raw_index, "Review not found at index");
                out_of_range += 1;
                continue;
            };
            if placed[index] {
                debug!(batch = batch_no, index, "Duplicate index, keeping first theme");
                continue;
            }
            let slot = buckets.resolve(&cat.theme);
            buckets.assign(slot, review);
            placed[index] = true;
        }

        let mut unmentioned = 0;
        for (review, _) in batch.iter().zip(&placed).filter(|(_, p)| !**p) {
            buckets.assign(buckets.fallback, review);
            unmentioned += 1;
        }
        if unmentioned > 0 {
            warn!(batch = batch_no, unmentioned, "Reviews missing from answer, assigned to {FALLBACK_THEME}");
        }

        info!(batch = batch_no, of = total, "Processed categorization batch");
        BatchOutcome::Categorized {
            unmentioned,
            out_of_range,
        }
    }
}

/// Draw up to `DISCOVERY_SAMPLE_SIZE` distinct reviews.
pub fn sample_reviews<'a, R: Rng + ?Sized>(reviews: &'a [Review], rng: &mut R) -> Vec<&'a Review> {
    reviews
        .choose_multiple(rng, DISCOVERY_SAMPLE_SIZE)
        .collect()
}

/// Parse the discovery answer into themes.
///
/// Anything other than a non-empty array of objects with non-empty `theme`
/// and `description` strings is an error. Repeated names keep the first.
pub fn parse_discovered_themes(text: &str) -> Result<Vec<DiscoveredTheme>> {
    let value = parse_model_json(text)?;
    let Value::Array(items) = value else {
        return Err(AnalysisError::invalid_theme_structure(
            "expected a JSON array of themes",
        ));
    };

    let mut themes: Vec<DiscoveredTheme> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let field = |key: &str| {
            item.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let (Some(name), Some(description)) = (field("theme"), field("description")) else {
            return Err(AnalysisError::invalid_theme_structure(format!(
                "element {i} lacks theme/description: {item}"
            )));
        };
        if themes.iter().any(|t| t.name == name) {
            continue;
        }
        themes.push(DiscoveredTheme {
            name: name.to_string(),
            description: description.to_string(),
        });
    }

    if themes.is_empty() {
        return Err(AnalysisError::invalid_theme_structure("no themes returned"));
    }
    Ok(themes)
}

/// One `{index, theme}` pair from a categorization answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorization {
    /// Position in the batch, or `None` when the answer's index cannot
    /// address a review (negative, fractional, missing or not a number)
    pub index: Option<usize>,
    /// The index exactly as the provider wrote it, for logs
    pub raw_index: String,
    pub theme: String,
}

/// Parse a categorization answer.
///
/// The answer must be a JSON array. Elements without a string `theme` are
/// dropped. Elements whose `index` is unusable are kept with `index: None`
/// so the caller logs and counts them like any other out-of-range index.
/// Integral floats such as `1.0` address the review at that position.
pub fn parse_categorizations(text: &str) -> Result<Vec<Categorization>> {
    let value = parse_model_json(text)?;
    let Value::Array(items) = value else {
        return Err(AnalysisError::response_parse(
            "categorization answer is not a JSON array",
        ));
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let theme = item.get("theme")?.as_str()?;
            let raw = item.get("index");
            Some(Categorization {
                index: raw.and_then(batch_index),
                raw_index: raw.map_or_else(|| "missing".to_string(), Value::to_string),
                theme: theme.to_string(),
            })
        })
        .collect())
}

fn batch_index(value: &Value) -> Option<usize> {
    let n = match value {
        Value::Number(n) => match n.as_u64() {
            Some(u) => return usize::try_from(u).ok(),
            None => n.as_f64()?,
        },
        Value::String(s) => {
            let s = s.trim();
            if let Ok(u) = s.parse::<u64>() {
                return usize::try_from(u).ok();
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
        Some(n as usize)
    } else {
        None
    }
}

/// Theme sentiment straight from the star rating.
pub fn rating_sentiment(rating: u8) -> Sentiment {
    match rating {
        r if r >= 4 => Sentiment::Positive,
        3 => Sentiment::Neutral,
        _ => Sentiment::Negative,
    }
}

struct Bucket {
    name: String,
    description: String,
    stats: ClusterStats,
}

/// Per-theme accumulators for one run, plus the fallback bucket.
pub struct ThemeBuckets {
    discovered: Vec<DiscoveredTheme>,
    buckets: Vec<Bucket>,
    by_name: HashMap<String, usize>,
    fallback: usize,
}

impl ThemeBuckets {
    pub fn new(discovered: Vec<DiscoveredTheme>) -> Self {
        let mut this = Self {
            discovered: Vec::new(),
            buckets: Vec::new(),
            by_name: HashMap::new(),
            fallback: 0,
        };
        for theme in &discovered {
            this.register(&theme.name, &theme.description);
        }
        this.fallback = this.register(FALLBACK_THEME, FALLBACK_DESCRIPTION);
        this.discovered = discovered;
        this
    }

    fn register(&mut self, name: &str, description: &str) -> usize {
        if let Some(&slot) = self.by_name.get(name) {
            return slot;
        }
        self.buckets.push(Bucket {
            name: name.to_string(),
            description: description.to_string(),
            stats: ClusterStats::new(usize::MAX),
        });
        let slot = self.buckets.len() - 1;
        self.by_name.insert(name.to_string(), slot);
        slot
    }

    /// Map a theme name from the provider onto a bucket.
    ///
    /// Exact name first, then the first discovered theme whose name contains,
    /// or is contained in, the answer (case-insensitive). Overlapping names
    /// such as "Suporte" / "Suporte Técnico" can therefore resolve to
    /// whichever was discovered first. Unknown or blank names go to "Outros".
    pub fn resolve(&self, theme: &str) -> usize {
        if let Some(&slot) = self.by_name.get(theme) {
            return slot;
        }
        let wanted = theme.trim().to_lowercase();
        if wanted.is_empty() {
            return self.fallback;
        }
        self.discovered
            .iter()
            .find(|t| {
                let name = t.name.to_lowercase();
                name.contains(&wanted) || wanted.contains(&name)
            })
            .and_then(|t| self.by_name.get(&t.name).copied())
            .unwrap_or(self.fallback)
    }

    pub fn assign(&mut self, slot: usize, review: &Review) {
        self.buckets[slot]
            .stats
            .add(review, rating_sentiment(review.rating));
    }

    /// Name of the bucket in `slot`.
    pub fn name(&self, slot: usize) -> &str {
        &self.buckets[slot].name
    }

    /// Reviews assigned so far across all buckets.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.stats.count).sum()
    }

    /// Drop empty buckets and rank the rest by size.
    pub fn into_clusters(self) -> Vec<ThemeCluster> {
        let mut clusters: Vec<ThemeCluster> = self
            .buckets
            .into_iter()
            .filter(|b| b.stats.count > 0)
            .map(|b| ThemeCluster {
                avg_rating: b.stats.avg_rating(),
                theme: b.name,
                description: b.description,
                count: b.stats.count,
                sentiment: b.stats.sentiment,
                reviews: b.stats.reviews,
            })
            .collect();
        sort_by_count_desc(&mut clusters);
        clusters
    }
}
