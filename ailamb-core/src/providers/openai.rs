//! OpenAI-compatible completion client
//!
//! Speaks the chat-completions wire format over HTTP, which also covers
//! LiteLLM proxies and other compatible gateways via `base_url`. The client
//! holds no per-call state and is safe to share across stages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::{Error, Result};

use super::retry::{retry_completion, RetryConfig};
use super::traits::{CompletionClient, CompletionError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Low temperature keeps report narrative close to the supplied findings.
const TEMPERATURE: f32 = 0.1;

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Build a client from provider configuration and a resolved API key.
    ///
    /// The per-request timeout bounds every call; a hung completion service
    /// surfaces as `NetworkFailure` instead of stalling the pipeline.
    pub fn from_config(config: &ProviderConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            retry: RetryConfig::default().with_max_retries(config.max_retries),
        })
    }

    async fn request_once(
        &self,
        prompt: &str,
        role_context: &str,
        max_tokens: u32,
    ) -> std::result::Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: role_context,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::NetworkFailure(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        parse_content(&text)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        prompt: &str,
        role_context: &str,
        max_tokens: u32,
    ) -> std::result::Result<String, CompletionError> {
        retry_completion(&self.retry, || {
            self.request_once(prompt, role_context, max_tokens)
        })
        .await
    }
}

fn map_transport_error(error: reqwest::Error) -> CompletionError {
    if error.is_timeout() {
        CompletionError::NetworkFailure("request timed out".to_string())
    } else {
        CompletionError::NetworkFailure(error.to_string())
    }
}

/// Map a non-2xx status to a typed error kind
fn classify_status(status: StatusCode, body: &str) -> CompletionError {
    let detail = format!("HTTP {}: {}", status.as_u16(), truncate(body, 200));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CompletionError::AuthenticationFailed(detail)
        }
        StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited(detail),
        _ => CompletionError::NetworkFailure(detail),
    }
}

/// Pull the first choice's message content out of a chat-completions body
fn parse_content(body: &str) -> std::result::Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| {
            CompletionError::MalformedResponse("response contained no completion text".to_string())
        })
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
