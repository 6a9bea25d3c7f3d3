//! Minimal client for the Gemini `generateContent` endpoint.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::FillError;

/// Content part: plain text or an inline file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

/// Inline file payload (used for PDF résumés)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Single user turn made of `parts`
    pub fn new(parts: Vec<Part>, temperature: f32, max_output_tokens: u32) -> Self {
        GenerateContentRequest {
            contents: vec![Content { role: None, parts }],
            generation_config: Some(GenerationConfig {
                temperature: Some(temperature),
                max_output_tokens: Some(max_output_tokens),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of `candidates[0].content.parts[0]`, if that is a text part
    pub fn first_text(&self) -> Option<&str> {
        let content = self.candidates.first()?.content.as_ref()?;
        match content.parts.first()? {
            Part::Text { text } => Some(text.as_str()),
            Part::InlineData { .. } => None,
        }
    }
}

/// Error response from API
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiError {
    pub error: GeminiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorDetail {
    #[serde(default)]
    pub message: String,
}

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// No request timeout is set; a model call waits as long as the connection stays up
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// One `generateContent` call, returning the trimmed text of the first candidate.
    ///
    /// A 429 maps to [`FillError::QuotaExceeded`]; every other failure maps to
    /// [`FillError::ModelUnavailable`] so the caller can move to the next model.
    pub async fn generate_text(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, FillError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!("Gemini generate_content: model={}", model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await
            .map_err(|e| FillError::model_unavailable(model, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FillError::model_unavailable(model, e.to_string()))?;

        debug!("Model {} - response status {}", model, status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FillError::QuotaExceeded);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(FillError::model_unavailable(model, "model not found"));
        }
        if !status.is_success() {
            let reason = match serde_json::from_str::<GeminiError>(&body) {
                Ok(e) if !e.error.message.is_empty() => format!("API error: {}", e.error.message),
                _ => format!("API error ({}): {}", status.as_u16(), body),
            };
            return Err(FillError::model_unavailable(model, reason));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            FillError::model_unavailable(model, format!("Failed to parse response: {}", e))
        })?;
        parsed
            .first_text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| FillError::model_unavailable(model, "Invalid API response format"))
    }
}
