//! Boundary to the model-serving backend.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::preview;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_MODEL: &str = "mlx-community/Qwen3-8B-4bit";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_TOKENS: u32 = 512;

const ERROR_BODY_CHARS: usize = 100;

/// Untouched result of one model call.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCompletion {
    pub text: String,
    pub latency: Duration,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("cannot connect to model endpoint at {endpoint}")]
    Connect { endpoint: String },
    #[error("model call timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    Malformed(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl CompletionError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Timeout { .. })
    }
}

/// Synchronous chat-completion collaborator.
pub trait ChatModel {
    fn complete(
        &self,
        user_text: &str,
        instructions: &str,
        temperature: f64,
    ) -> Result<RawCompletion, CompletionError>;
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

/// OpenAI-compatible `/v1/chat/completions` client.
#[derive(Debug)]
pub struct HttpChatModel {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl HttpChatModel {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        if config.timeout_secs == 0 {
            bail!("--timeout-secs must be at least 1");
        }
        let timeout_secs = config.timeout_secs;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: chat_endpoint(&config.base_url),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else if err.is_connect() {
            CompletionError::Connect {
                endpoint: self.endpoint.clone(),
            }
        } else {
            CompletionError::Transport(err.to_string())
        }
    }
}

impl ChatModel for HttpChatModel {
    fn complete(
        &self,
        user_text: &str,
        instructions: &str,
        temperature: f64,
    ) -> Result<RawCompletion, CompletionError> {
        // The backend sees a single user turn with instructions prepended, the
        // same shape the app sends.
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(compose_prompt(instructions, user_text)),
            }],
            temperature,
            max_tokens: self.max_tokens,
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|err| self.classify(err))?;
        let status = response.status();
        let body = response.text().map_err(|err| self.classify(err))?;
        let latency = started.elapsed();

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        let text = parse_completion_text(&body)?;
        Ok(RawCompletion { text, latency })
    }
}

pub fn chat_endpoint(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
}

pub fn compose_prompt(instructions: &str, user_text: &str) -> String {
    format!("{instructions}\n\n{user_text}")
}

/// Non-2xx reply; the body is cut short so it stays readable in logs and reports.
fn status_error(status: u16, body: &str) -> CompletionError {
    CompletionError::Status {
        status,
        body: preview(body.trim(), ERROR_BODY_CHARS),
    }
}

fn parse_completion_text(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|err| CompletionError::Malformed(err.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::Malformed("response has no choices".to_string()))?;
    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}
