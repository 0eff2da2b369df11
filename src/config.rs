use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::appstore::client::{DEFAULT_APPSTORE_BASE_URL, DEFAULT_COUNTRY};

/// Default per-call timeout for feed pages and provider completions.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Credentials and knobs for the text-generation providers.
///
/// Passed explicitly into provider selection; the theme engine never reads
/// the environment itself.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Gemini credential. Preferred whenever present.
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_model: String,
    /// Timeout applied to each completion call
    pub timeout: Duration,
    /// Minimum spacing between consecutive provider calls
    pub min_interval: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            openai_api_key: None,
            gemini_model: crate::themes::gemini::DEFAULT_GEMINI_MODEL.to_string(),
            openai_model: crate::themes::openai::DEFAULT_OPENAI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            min_interval: Duration::ZERO,
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars only. The .env file is loaded at startup
/// via dotenvy.
pub struct Config {
    /// App Store endpoint (lookup + customer-review RSS)
    pub appstore_base_url: String,
    /// Storefront country code used for lookup and the review feed
    pub appstore_country: String,
    /// Timeout applied to each feed page request
    pub http_timeout: Duration,
    pub provider: ProviderConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; provider credentials are only checked when
    /// theme analysis actually runs.
    pub fn load() -> Result<Self> {
        let timeout_secs = match non_empty_var("REVIEWSCOPE_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("REVIEWSCOPE_HTTP_TIMEOUT_SECS is not a number: {raw}"))?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        let min_interval_ms = match non_empty_var("REVIEWSCOPE_PROVIDER_MIN_INTERVAL_MS") {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!("REVIEWSCOPE_PROVIDER_MIN_INTERVAL_MS is not a number: {raw}")
            })?,
            None => 0,
        };
        let http_timeout = Duration::from_secs(timeout_secs);

        let defaults = ProviderConfig::default();
        let provider = ProviderConfig {
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            gemini_model: non_empty_var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            openai_model: non_empty_var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            timeout: http_timeout,
            min_interval: Duration::from_millis(min_interval_ms),
        };

        Ok(Self {
            appstore_base_url: non_empty_var("APPSTORE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_APPSTORE_BASE_URL.to_string()),
            appstore_country: non_empty_var("APPSTORE_COUNTRY")
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            http_timeout,
            provider,
        })
    }

    /// Check that at least one provider credential is configured.
    /// Call this before theme analysis so the user gets the hint up front.
    pub fn require_provider(&self) -> Result<()> {
        if self.provider.gemini_api_key.is_none() && self.provider.openai_api_key.is_none() {
            anyhow::bail!(
                "No AI provider configured. Set GEMINI_API_KEY (free at \
                 https://aistudio.google.com/app/apikey) or OPENAI_API_KEY in your .env file.\n\
                 Word, topic and phrase analysis work without it."
            );
        }
        Ok(())
    }
}

/// Read an env var, treating empty or whitespace-only values as unset.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
