// Completion provider trait and provider selection.

use async_trait::async_trait;
use tracing::info;

use super::gemini::GeminiProvider;
use super::openai::OpenAiProvider;
use crate::config::ProviderConfig;
use crate::error::{AnalysisError, Result};

/// One prompt for a text-generation provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Standing instruction (role / output format)
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A text-generation backend: prompt in, raw text out.
///
/// Implementations own their HTTP client, timeout and pacing. Transport
/// failures, non-2xx answers and unexpected response shapes come back as
/// errors; interpreting the returned text is the caller's job.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs ("gemini", "openai").
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Which backend a configuration resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    /// Gemini wins whenever its key is present; OpenAI is the fallback.
    pub fn select(config: &ProviderConfig) -> Result<Self> {
        if config.gemini_api_key.is_some() {
            Ok(ProviderKind::Gemini)
        } else if config.openai_api_key.is_some() {
            Ok(ProviderKind::OpenAi)
        } else {
            Err(AnalysisError::ProviderNotConfigured)
        }
    }
}

/// Build the preferred provider for this configuration.
///
/// Fails with `ProviderNotConfigured` before any network activity when no
/// credential is present.
pub fn select_provider(config: &ProviderConfig) -> Result<Box<dyn CompletionProvider>> {
    let kind = ProviderKind::select(config)?;
    info!(provider = ?kind, "Selected AI provider");

    match (kind, &config.gemini_api_key, &config.openai_api_key) {
        (ProviderKind::Gemini, Some(key), _) => Ok(Box::new(GeminiProvider::new(
            key.clone(),
            config.gemini_model.clone(),
            config.timeout,
            config.min_interval,
        )?)),
        (ProviderKind::OpenAi, _, Some(key)) => Ok(Box::new(OpenAiProvider::new(
            key.clone(),
            config.openai_model.clone(),
            config.timeout,
            config.min_interval,
        )?)),
        _ => Err(AnalysisError::ProviderNotConfigured),
    }
}
