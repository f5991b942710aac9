//! Google Gemini `generateContent` client.
//!
//! Auth is the `key` query parameter. Only single-shot replies are used.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("rate limited by remote model")]
    RateLimited,

    #[error("remote model returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("remote request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to parse remote response: {0}")]
    Malformed(String),

    #[error("empty response from remote model")]
    Empty,
}

impl RemoteError {
    /// Only rate limiting is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoteError::RateLimited)
    }
}

/// A remote generative-language model.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, system_prompt: &str, utterance: &str) -> Result<String, RemoteError>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

fn build_request(system_prompt: &str, utterance: &str) -> GeminiRequest {
    let system_instruction = (!system_prompt.is_empty()).then(|| GeminiContent {
        role: None,
        parts: vec![GeminiPart {
            text: system_prompt.to_string(),
        }],
    });

    GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: utterance.to_string(),
            }],
        }],
        system_instruction,
        generation_config: GenerationConfig::default(),
    }
}

fn extract_text(parsed: &GeminiResponse) -> Result<String, RemoteError> {
    let text = parsed
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .map(|p| p.text.trim())
        .unwrap_or_default();

    if text.is_empty() {
        Err(RemoteError::Empty)
    } else {
        Ok(text.to_string())
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, system_prompt: &str, utterance: &str) -> Result<String, RemoteError> {
        let body = build_request(system_prompt, utterance);
        debug!("gemini: POST models/{}:generateContent", self.model);

        let resp = self.client.post(self.endpoint()).json(&body).send().await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, body });
        }

        let raw = resp.text().await?;
        let parsed: GeminiResponse =
            serde_json::from_str(&raw).map_err(|e| RemoteError::Malformed(e.to_string()))?;
        extract_text(&parsed)
    }
}
