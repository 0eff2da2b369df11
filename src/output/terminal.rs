// Colored terminal output for app summaries and cluster views.
//
// main.rs delegates all human-readable display here; `--json` output
// bypasses this module entirely.

use colored::Colorize;

use crate::analysis::cluster::{ClusterView, SentimentDistribution, TopicCluster};
use crate::analysis::sentiment::SentimentSummary;
use crate::appstore::client::AppInfo;
use crate::reviews::RatingDistribution;

/// Display app metadata and the store's lifetime rating.
pub fn display_app(app: &AppInfo, ingested: usize) {
    println!(
        "\n{}",
        format!("=== {} ({}) ===", app.name, app.developer).bold()
    );
    println!(
        "  Store rating: {:.2} from {} ratings (all time)",
        app.average_rating, app.total_reviews
    );
    println!("  Reviews ingested (last 12 months): {ingested}");
    if !app.store_url.is_empty() {
        println!("  {}", app.store_url.dimmed());
    }
}

/// Display the star distribution of the ingested reviews as a bar chart.
pub fn display_distribution(distribution: &RatingDistribution) {
    let total: usize = distribution.iter().map(|s| s.count).sum();
    let bar_width: usize = 30;

    println!("\n{}", "Rating distribution".bold());
    for bucket in distribution.iter().rev() {
        let share = if total == 0 {
            0.0
        } else {
            bucket.count as f64 / total as f64
        };
        let filled = (share * bar_width as f64).round() as usize;
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled),
            " ".repeat(bar_width.saturating_sub(filled))
        );
        let colored_bar = match bucket.stars {
            4 | 5 => bar.green(),
            3 => bar.yellow(),
            _ => bar.red(),
        };
        println!(
            "  {}★ {} {:>5} ({:>5.1}%)",
            bucket.stars,
            colored_bar,
            bucket.count,
            share * 100.0
        );
    }
}

/// Display overall sentiment counts.
pub fn display_sentiment_summary(summary: &SentimentSummary) {
    println!("\n{}", "Sentiment".bold());
    println!(
        "  {} positive  {} neutral  {} negative  (avg score {:+.2})",
        summary.positive.to_string().green(),
        summary.neutral.to_string().yellow(),
        summary.negative.to_string().red(),
        summary.average_score
    );
}

/// Display a ranked list of clusters of any kind.
pub fn display_clusters<C: ClusterView>(title: &str, clusters: &[C], limit: usize) {
    println!(
        "\n{}",
        format!("=== {title} ({} clusters) ===", clusters.len()).bold()
    );
    if clusters.is_empty() {
        println!("  {}", "Nothing recurring enough to cluster.".dimmed());
        return;
    }

    for (i, cluster) in clusters.iter().take(limit).enumerate() {
        println!(
            "  {:>2}. {:<40} {:>5}  avg {:.1}★  {}",
            i + 1,
            super::truncate_chars(cluster.label(), 37).bold(),
            cluster.count(),
            cluster.avg_rating(),
            sentiment_bar(cluster.sentiment()),
        );
        if let Some(sample) = cluster.reviews().first() {
            println!(
                "      {}",
                format!("\"{}\"", super::truncate_chars(&sample.text, 100)).dimmed()
            );
        }
    }
    if clusters.len() > limit {
        println!("  {}", format!("... and {} more", clusters.len() - limit).dimmed());
    }
}

/// Display topic clusters with a few of their keywords.
pub fn display_topics(clusters: &[TopicCluster]) {
    display_clusters("Topics", clusters, clusters.len());
    for cluster in clusters {
        let keywords: Vec<&str> = cluster.keywords.iter().take(6).map(String::as_str).collect();
        println!("      {}: {}", cluster.topic, keywords.join(", ").dimmed());
    }
}

/// Compact "+12 ~3 -5" rendering of a sentiment distribution.
fn sentiment_bar(sentiment: &SentimentDistribution) -> String {
    format!(
        "{} {} {}",
        format!("+{}", sentiment.positive).green(),
        format!("~{}", sentiment.neutral).yellow(),
        format!("-{}", sentiment.negative).red()
    )
}
