//! Messages API client used by the rewrite service.
//!
//! Nothing else in Folio talks to the model provider directly.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .find_map(|block| block.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Outcome of a single request.
enum Attempt {
    Done(LlmResponse),
    Retry(LlmError),
    Fail(LlmError),
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// 1s, 2s, 4s, ...
fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF * 2u32.saturating_pow(attempt.saturating_sub(1))
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Self::with_url(api_key, ANTHROPIC_API_URL.to_string())
    }

    /// Points the client at a different Messages endpoint.
    pub fn with_url(api_key: String, api_url: String) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            api_url,
        })
    }

    /// Sends one user turn. Transport failures, 429 and 5xx are retried
    /// with exponential backoff; other non-success statuses fail at once.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = backoff(attempt);
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying LLM call");
                tokio::time::sleep(delay).await;
            }
            match self.attempt(&body).await {
                Attempt::Done(response) => {
                    if let Some(usage) = &response.usage {
                        debug!(
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "LLM call succeeded"
                        );
                    }
                    return Ok(response);
                }
                Attempt::Retry(e) => last_error = Some(e),
                Attempt::Fail(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_ATTEMPTS,
        }))
    }

    async fn attempt(&self, body: &MessagesRequest<'_>) -> Attempt {
        let sent = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(e.into()),
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<LlmResponse>().await {
                Ok(parsed) => Attempt::Done(parsed),
                Err(e) => Attempt::Fail(e.into()),
            };
        }

        let raw = response.text().await.unwrap_or_default();
        if is_retryable(status) {
            warn!(status = status.as_u16(), body = %raw, "LLM API unavailable");
            return Attempt::Retry(LlmError::Api {
                status: status.as_u16(),
                message: raw,
            });
        }
        let message = serde_json::from_str::<ErrorEnvelope>(&raw)
            .map(|envelope| envelope.error.message)
            .unwrap_or(raw);
        Attempt::Fail(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// First text block of the reply, trimmed and unfenced.
    pub async fn call_text(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        match response.text().map(strip_fences) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(LlmError::EmptyContent),
        }
    }
}

/// Removes a surrounding ``` fence and its optional language tag.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let body = match inner.split_once('\n') {
        Some((tag, rest)) if !tag.trim().contains(' ') => rest,
        _ => inner,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
