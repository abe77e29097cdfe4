//! OpenAI-compatible chat-completions client.
//!
//! Implements the `TournamentExtractor` trait against any endpoint
//! speaking the OpenAI chat-completions dialect. Groq is the default
//! provider (the free tier is enough for a scraping run); the OpenAI
//! endpoint works unchanged. Handles request shaping, inter-request
//! rate limiting, and retry with exponential backoff.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use super::TournamentExtractor;
use crate::error::ExtractionError;
use crate::prompt::{PROBE_ACK, PROBE_PROMPT, SYSTEM_PROMPT};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

const DEFAULT_GROQ_MODEL: &str = "llama3-70b-8192";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Low temperature favors deterministic extraction over creativity.
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TOP_P: f32 = 1.0;

/// Minimum gap between any two endpoint calls from one client.
const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Summary calls tolerate a little more variety and need few tokens.
const SUMMARY_TEMPERATURE: f32 = 0.3;
const SUMMARY_MAX_TOKENS: u32 = 100;

const PROBE_MAX_TOKENS: u32 = 10;

/// Maximum retries on rate limit / server errors.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (ms).
const BASE_BACKOFF_MS: u64 = 1000;

/// Endpoint, model, and pacing knobs for a [`ChatCompletionClient`].
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub min_request_interval: Duration,
}

impl ChatOptions {
    pub fn groq() -> Self {
        Self {
            endpoint: GROQ_API_URL.to_string(),
            model: DEFAULT_GROQ_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
        }
    }

    pub fn openai() -> Self {
        Self {
            model: DEFAULT_OPENAI_MODEL.to_string(),
            endpoint: OPENAI_API_URL.to_string(),
            ..Self::groq()
        }
    }
}

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ChatCompletionClient {
    http: Client,
    api_key: SecretString,
    options: ChatOptions,
    /// Timestamp of the last request, gating the minimum interval.
    /// Held across the sleep so concurrent callers queue behind it.
    last_request: Mutex<Option<Instant>>,
    total_calls: AtomicU64,
}

impl ChatCompletionClient {
    pub fn new(api_key: SecretString, options: ChatOptions) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build extraction HTTP client")?;

        Ok(Self {
            http,
            api_key,
            options,
            last_request: Mutex::new(None),
            total_calls: AtomicU64::new(0),
        })
    }

    /// Total number of endpoint calls attempted so far.
    pub fn total_calls(&self) -> u64 {
        self.total_calls.load(Ordering::Relaxed)
    }

    /// Block until at least the minimum interval has elapsed since the
    /// previous request, then claim the current slot.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.options.min_request_interval {
                let wait = self.options.min_request_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Rate limit, pausing");
                sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Send a chat request with rate limiting, retry, and backoff.
    async fn call_api(
        &self,
        system: Option<&str>,
        user_message: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, ExtractionError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: user_message.to_string(),
        });

        let request = ChatRequest {
            model: self.options.model.clone(),
            messages,
            temperature,
            max_tokens,
            top_p: DEFAULT_TOP_P,
            stream: false,
        };

        let mut last_error = String::new();

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                debug!(attempt, delay_ms = delay, "Retrying extraction call");
                sleep(Duration::from_millis(delay)).await;
            }

            self.throttle().await;
            self.total_calls.fetch_add(1, Ordering::Relaxed);

            let resp = self
                .http
                .post(&self.options.endpoint)
                .header(
                    "Authorization",
                    format!("Bearer {}", self.api_key.expose_secret()),
                )
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let body: ChatResponse = response
                            .json()
                            .await
                            .map_err(|e| ExtractionError::Payload(e.to_string()))?;

                        return body
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.message)
                            .map(|m| m.content)
                            .ok_or_else(|| {
                                ExtractionError::Payload("response had no choices".to_string())
                            });
                    }

                    // Retryable: 429 (rate limit) and server errors.
                    if status.as_u16() == 429 || status.as_u16() >= 500 {
                        let body = response.text().await.unwrap_or_default();
                        warn!(status = %status, attempt, "Retryable endpoint error");
                        last_error = format!("HTTP {status}: {body}");
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(ExtractionError::Status { status, body });
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Extraction request failed");
                    last_error = format!("request error: {e}");
                    continue;
                }
            }
        }

        Err(ExtractionError::Exhausted {
            attempts: MAX_RETRIES + 1,
            last: last_error,
        })
    }
}

#[async_trait]
impl TournamentExtractor for ChatCompletionClient {
    async fn extract(&self, prompt: &str) -> Result<String, ExtractionError> {
        debug!(model = %self.options.model, prompt_chars = prompt.len(), "Extraction call");
        self.call_api(
            Some(SYSTEM_PROMPT),
            prompt,
            self.options.temperature,
            self.options.max_tokens,
        )
        .await
    }

    async fn summarize(&self, tournament_text: &str) -> Result<String, ExtractionError> {
        let prompt = crate::prompt::build_summary_prompt(tournament_text);
        let reply = self
            .call_api(None, &prompt, SUMMARY_TEMPERATURE, SUMMARY_MAX_TOKENS)
            .await?;
        Ok(reply.trim().to_string())
    }

    async fn test_connection(&self) -> bool {
        match self
            .call_api(None, PROBE_PROMPT, 0.0, PROBE_MAX_TOKENS)
            .await
        {
            Ok(reply) => {
                let ok = reply.to_uppercase().contains(PROBE_ACK);
                if !ok {
                    warn!(reply = %reply, "Connectivity probe got unexpected reply");
                }
                ok
            }
            Err(e) => {
                warn!(error = %e, "Connectivity probe failed");
                false
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.options.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
