// Error kinds shared across ingestion and theme analysis.
//
// The binary works in anyhow; library entry points return these so callers
// can tell a missing credential from a flaky network.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Feed or provider unreachable, timed out, or answered with a non-2xx status
    #[error("Network error: {message}")]
    Network { message: String },

    /// Neither provider credential is present
    #[error(
        "No AI provider configured. Set GEMINI_API_KEY (free at \
         https://aistudio.google.com/app/apikey) or OPENAI_API_KEY in your .env file."
    )]
    ProviderNotConfigured,

    /// Malformed or truncated JSON in a provider answer
    #[error("Could not parse provider response: {message}")]
    ResponseParse { message: String },

    /// Discovery answer parsed but is not a list of {theme, description}
    #[error("Invalid theme structure returned by AI: {message}")]
    InvalidThemeStructure { message: String },

    /// A single review-feed page could not be fetched or decoded
    #[error("Feed page {page} failed: {message}")]
    FeedPage { page: u32, message: String },

    #[error("App {app_id} not found in the store")]
    NotFound { app_id: String },

    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn response_parse(message: impl Into<String>) -> Self {
        Self::ResponseParse {
            message: message.into(),
        }
    }

    pub fn invalid_theme_structure(message: impl Into<String>) -> Self {
        Self::InvalidThemeStructure {
            message: message.into(),
        }
    }

    pub fn feed_page(page: u32, message: impl Into<String>) -> Self {
        Self::FeedPage {
            page,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::response_parse(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}
