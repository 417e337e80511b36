//! Gemini `generateContent` client.

use async_trait::async_trait;
use climahealth_core::ReqwestErrorExt;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::instrument;

use crate::error::InsightError;

/// Single-turn text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` as one user turn and return the generated text.
    ///
    /// # Errors
    /// Authentication, quota, transport and response-shape failures.
    async fn generate(&self, prompt: &str) -> Result<String, InsightError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    fn into_text(self) -> Result<String, InsightError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(InsightError::EmptyResponse(
                block_reason
                    .map(|r| format!("prompt blocked ({})", r))
                    .unwrap_or_else(|| "no candidates".to_string()),
            ));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(InsightError::EmptyResponse(format!(
                "finish reason {}",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// `model` may carry the `models/` prefix used by the API listing.
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.trim_start_matches("models/").to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<String, InsightError> {
        let status = response.status();

        if status.is_success() {
            let body: GenerateContentResponse = response
                .json()
                .await
                .map_err(|e| InsightError::Parse(format!("JSON parse error: {}", e)))?;
            return body.into_text();
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(InsightError::Unauthorized(message))
            }
            // Invalid keys come back as 400 INVALID_ARGUMENT
            StatusCode::BAD_REQUEST if message.contains("API key") => {
                Err(InsightError::Unauthorized(message))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(InsightError::QuotaExceeded(message)),
            _ => Err(InsightError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model), level = "info")]
    async fn generate(&self, prompt: &str) -> Result<String, InsightError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);

        let body = serde_json::json!({
            "contents": [
                {"role": "user", "parts": [{"text": prompt}]}
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InsightError::Network(e.into_network_error()))?;

        let text = self.handle_response(response).await?;
        tracing::debug!(chars = text.len(), "Generated explanation");
        Ok(text)
    }
}
