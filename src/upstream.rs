use crate::io_struct::ChatTurn;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Error code: {} - {body}", .status.as_u16())]
    Status { status: StatusCode, body: String },

    #[error("invalid completion response: {0}")]
    InvalidResponse(String),

    #[error("completion returned no content")]
    EmptyCompletion,

    /// Failure reported by a non-HTTP backend implementation.
    #[error("{0}")]
    Backend(String),
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        CompletionParams {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
}

/// The upstream "generate a completion" capability.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatTurn],
        params: &CompletionParams,
    ) -> Result<Completion, UpstreamError>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Deserialize)]
struct ApiErrorMessage {
    message: String,
}

/// Client for the OpenAI chat completions endpoint (or any API speaking
/// the same protocol under `api_base`).
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, api_base: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key, api_base))
    }

    pub fn with_client(client: Client, api_key: &str, api_base: &str) -> Self {
        OpenAIClient {
            client,
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_path(&self, api_path: &str) -> String {
        if api_path.starts_with('/') {
            format!("{}{}", self.api_base, api_path)
        } else {
            format!("{}/{}", self.api_base, api_path)
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAIClient {
    async fn complete(
        &self,
        messages: &[ChatTurn],
        params: &CompletionParams,
    ) -> Result<Completion, UpstreamError> {
        let request = ChatCompletionRequest {
            model: &params.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };
        log::debug!(
            "Sending {} messages to {} (model {})",
            messages.len(),
            self.api_base,
            params.model
        );

        let resp = self
            .client
            .post(self.api_path("/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            let body = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(err) => err.error.message,
                Err(_) => text,
            };
            return Err(UpstreamError::Status { status, body });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| Completion { text })
            .ok_or(UpstreamError::EmptyCompletion)
    }
}
