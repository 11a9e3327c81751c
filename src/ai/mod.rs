//! Chat-completion client for message drafting, contact search, and
//! summaries.
//!
//! [`ChatClient`] speaks the OpenAI-compatible `/chat/completions` protocol.
//! Failures are reported as [`AiError`], which also carries the HTTP status
//! the service surface answers with.

pub mod functions;
pub mod prompts;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI API key is not configured")]
    MissingApiKey,

    #[error("rate limited by the AI provider, please try again later")]
    RateLimited,

    #[error("AI credits exhausted, please add funds to continue")]
    CreditsExhausted,

    #[error("AI provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("AI request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid AI response: {0}")]
    InvalidResponse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AiError {
    /// Status code to answer a caller with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RateLimited => 429,
            Self::CreditsExhausted => 402,
            Self::InvalidRequest(_) => 400,
            Self::MissingApiKey
            | Self::Upstream { .. }
            | Self::Transport(_)
            | Self::InvalidResponse(_) => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: "https://api.openai.com/v1".into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a client from config. Fails before any request is made when no
    /// API key is configured.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AiError::MissingApiKey)?;
        Ok(Self::new(api_key, config.model.clone()).with_base_url(config.base_url.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat completion and return the first choice's text.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model = %self.model, messages = messages.len(), "chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "chat completion failed");
            return Err(match status.as_u16() {
                429 => AiError::RateLimited,
                402 => AiError::CreditsExhausted,
                code => AiError::Upstream { status: code, body },
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| AiError::InvalidResponse("no completion choices".into()))
    }
}
