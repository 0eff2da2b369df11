use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{info, warn};

use reviewscope::analysis::{phrases, sentiment, topics, words};
use reviewscope::appstore::client::AppStoreClient;
use reviewscope::appstore::ingest::{fetch_app_details, AppDetails};
use reviewscope::cancel::CancellationToken;
use reviewscope::config::Config;
use reviewscope::output::terminal;
use reviewscope::reviews::filters::{filter_by_date_range, filter_by_version, DateRange};
use reviewscope::themes::engine::ThemeAnalysis;
use reviewscope::themes::provider::select_provider;

/// ReviewScope: sentiment and clustering analytics for app-store reviews.
///
/// Pulls the last twelve months of reviews for an App Store app and breaks
/// them down by sentiment, frequent words, topics, recurring phrases and
/// AI-discovered themes.
#[derive(Parser)]
#[command(name = "reviewscope", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an app's recent reviews and show rating and sentiment summaries
    Reviews {
        /// Numeric App Store id (e.g. 389801252)
        app_id: String,

        /// Print the app, reviews and distribution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cluster an app's recent reviews
    Analyze {
        /// Numeric App Store id
        app_id: String,

        /// Which cluster view to compute
        #[arg(long, value_enum, default_value = "all")]
        kind: AnalysisKind,

        /// Only analyze reviews for this app version ("Desconhecida" for unknown)
        #[arg(long, default_value = "all")]
        version: String,

        /// Only analyze reviews from this window (7days, 15days, 1month, 3months, 6months, 1year)
        #[arg(long, default_value = "1year")]
        range: DateRange,

        /// Seed for the theme-discovery sample (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Print clusters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score a single piece of text
    Sentiment {
        /// Star rating, 1 to 5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,

        /// Review text
        text: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnalysisKind {
    Words,
    Topics,
    Phrases,
    Themes,
    All,
}

impl AnalysisKind {
    fn includes(self, other: AnalysisKind) -> bool {
        self == AnalysisKind::All || self == other
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("reviewscope=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Reviews { app_id, json } => {
            let config = Config::load()?;
            let cancel = cancel_on_ctrl_c();
            let details = load_app(&config, &app_id, &cancel).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&details)?);
                return Ok(());
            }

            terminal::display_app(&details.app, details.reviews.len());
            terminal::display_distribution(&details.distribution);
            terminal::display_sentiment_summary(&sentiment::overall_sentiment(&details.reviews));
        }

        Commands::Analyze {
            app_id,
            kind,
            version,
            range,
            seed,
            json,
        } => {
            let config = Config::load()?;
            if kind.includes(AnalysisKind::Themes) {
                config.require_provider()?;
            }
            let cancel = cancel_on_ctrl_c();
            let details = load_app(&config, &app_id, &cancel).await?;

            let reviews = filter_by_version(&details.reviews, &version);
            let reviews = filter_by_date_range(&reviews, range, chrono::Utc::now());
            info!(
                total = details.reviews.len(),
                selected = reviews.len(),
                version = %version,
                range = %range,
                "Selected reviews for analysis"
            );

            let mut output = serde_json::Map::new();

            if kind.includes(AnalysisKind::Words) {
                let clusters = words::extract_word_clusters(&reviews);
                if json {
                    output.insert("words".into(), serde_json::to_value(&clusters)?);
                } else {
                    terminal::display_clusters("Frequent words", &clusters, 20);
                }
            }

            if kind.includes(AnalysisKind::Topics) {
                let clusters = topics::extract_topic_clusters(&reviews);
                if json {
                    output.insert("topics".into(), serde_json::to_value(&clusters)?);
                } else {
                    terminal::display_topics(&clusters);
                }
            }

            if kind.includes(AnalysisKind::Phrases) {
                let clusters = phrases::extract_phrase_clusters(&reviews);
                if json {
                    output.insert("phrases".into(), serde_json::to_value(&clusters)?);
                } else {
                    terminal::display_clusters("Recurring phrases", &clusters, 15);
                }
            }

            if kind.includes(AnalysisKind::Themes) {
                let provider = select_provider(&config.provider)?;
                let mut rng = match seed {
                    Some(s) => StdRng::seed_from_u64(s),
                    None => StdRng::from_os_rng(),
                };

                let pb = spinner(format!(
                    "Discovering themes in {} reviews with {}...",
                    reviews.len(),
                    provider.name()
                ));
                let result = ThemeAnalysis::new(&reviews, provider.as_ref(), &cancel)
                    .run(&mut rng)
                    .await;
                pb.finish_and_clear();
                let report = result.context("Theme analysis failed")?;

                if report.fallback_batches() > 0 {
                    warn!(
                        failed = report.fallback_batches(),
                        batches = report.batches.len(),
                        "Some batches could not be categorized and went to Outros"
                    );
                }

                if json {
                    output.insert("themes".into(), serde_json::to_value(&report.clusters)?);
                } else {
                    terminal::display_clusters("AI themes", &report.clusters, report.clusters.len());
                    for cluster in &report.clusters {
                        println!("      {}: {}", cluster.theme, cluster.description.dimmed());
                    }
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }

        Commands::Sentiment { rating, text } => {
            let result = sentiment::score(&text, rating);
            let label = match result.sentiment {
                sentiment::Sentiment::Positive => result.sentiment.as_str().green(),
                sentiment::Sentiment::Neutral => result.sentiment.as_str().yellow(),
                sentiment::Sentiment::Negative => result.sentiment.as_str().red(),
            };
            println!("{} (score {:+.2})", label.bold(), result.score);
        }
    }

    Ok(())
}

/// Look up the app and ingest its reviews behind a spinner.
async fn load_app(config: &Config, app_id: &str, cancel: &CancellationToken) -> Result<AppDetails> {
    let client = AppStoreClient::new(
        &config.appstore_base_url,
        &config.appstore_country,
        config.http_timeout,
    )?;

    let pb = spinner(format!("Fetching reviews for app {app_id}..."));
    let result = fetch_app_details(&client, app_id, cancel).await;
    pb.finish_and_clear();

    let details: AppDetails =
        result.with_context(|| format!("Failed to load app {app_id} from the App Store"))?;
    if details.reviews.is_empty() {
        eprintln!(
            "{}",
            "No reviews from the last 12 months were returned by the store.".dimmed()
        );
    }
    Ok(details)
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Cancellation token tripped by Ctrl-C. Work stops at the next page or
/// batch boundary.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling after the current request...");
            handle.cancel();
        }
    });
    cancel
}
