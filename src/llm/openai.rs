//! OpenAI-compatible chat-completions client (OpenAI, OpenRouter)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LlmClient;
use crate::config::{LlmConfig, LlmProvider};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
const OPENROUTER_HEADERS: &[(&str, &str)] = &[
    ("HTTP-Referer", "https://github.com/tonitangpotato/agentflow"),
    ("X-Title", "agentflow"),
];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol
#[derive(Debug)]
pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    extra_headers: &'static [(&'static str, &'static str)],
}

impl OpenAiClient {
    /// Build a client from the `llm` config section.
    ///
    /// `base_url` replaces the provider's default API root; the provider's
    /// extra headers are sent either way.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .with_context(|| format!("An API key is required for provider {}", config.provider))?;

        let (default_base, extra_headers) = match config.provider {
            LlmProvider::OpenRouter => (OPENROUTER_API_BASE, OPENROUTER_HEADERS),
            _ => (OPENAI_API_BASE, &[][..]),
        };
        let base = config.base_url.as_deref().unwrap_or(default_base);

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            extra_headers,
        })
    }

    /// Full chat-completions URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: Option<f32>,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: temperature.unwrap_or(self.temperature),
            max_tokens: self.max_tokens,
        };

        let mut request = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        for (name, value) in self.extra_headers {
            request = request.header(*name, *value);
        }

        log::debug!("POST {} (model {})", self.endpoint, self.model);
        let response = request
            .send()
            .await
            .context("Failed to generate completion")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            anyhow::bail!("Failed to generate completion: HTTP {}: {}", status, body);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Malformed chat completion response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat completion returned no content")
    }
}
