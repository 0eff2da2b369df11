// Google Gemini provider (generateContent REST API).
//
// The API key travels as a query parameter. Gemini has no separate system
// role in this endpoint, so the standing instruction is prepended to the
// prompt text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pacer::Pacer;
use super::provider::{CompletionProvider, CompletionRequest};
use crate::error::{AnalysisError, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    pacer: Pacer,
}

impl GeminiProvider {
    pub fn new(
        api_key: String,
        model: String,
        timeout: Duration,
        min_interval: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
            pacer: Pacer::new(min_interval),
        })
    }

    /// Point the provider at a different endpoint (proxy, emulator).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.pacer.wait_turn().await;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{}\n\n{}", request.system, request.prompt),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AnalysisError::network(format!(
                "Gemini API returned {status}: {}",
                api_error_message(&text)
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AnalysisError::response_parse("Gemini response has no candidate text"))?;

        debug!(chars = text.len(), "Gemini completion received");
        Ok(text.trim().to_string())
    }
}

/// Pull `error.message` out of an API error body, or return the raw body.
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message)
        .unwrap_or_else(|| body.chars().take(300).collect())
}

#[derive(Deserialize)]
pub(crate) struct ApiErrorBody {
    error: Option<ApiError>,
}

#[derive(Deserialize)]
pub(crate) struct ApiError {
    message: String,
}

// --- Gemini request/response types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "oi".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: 1000,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "oi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn test_response_without_candidates_parses_empty() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn test_api_error_message_extraction() {
        let body = r#"{"error": {"code": 429, "message": "RATE_LIMIT_EXCEEDED", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(api_error_message(body), "RATE_LIMIT_EXCEEDED");
        assert_eq!(api_error_message("plain failure"), "plain failure");
    }
}
