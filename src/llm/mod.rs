//! Language model clients used by the content agents
//!
//! `mock` answers offline with canned responses; `openai` and `openrouter`
//! talk to an OpenAI-compatible chat-completions endpoint.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::OpenAiClient;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{Config, LlmProvider};

const JSON_INSTRUCTION: &str = "IMPORTANT: Respond with valid JSON only. No additional text.";

/// Sampling temperature used for JSON responses
const JSON_TEMPERATURE: f32 = 0.5;

/// Chat-completion style language model
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One system + user exchange. `temperature` overrides the client default.
    async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: Option<f32>,
    ) -> Result<String>;

    /// Free-text completion at the default temperature
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.chat(system_prompt, user_prompt, None).await
    }

    /// Completion parsed as JSON
    async fn complete_json(&self, system_prompt: &str, user_prompt: &str) -> Result<Value> {
        let system_prompt = format!("{}\n\n{}", system_prompt, JSON_INSTRUCTION);
        let response = self
            .chat(&system_prompt, user_prompt, Some(JSON_TEMPERATURE))
            .await?;
        parse_json_response(&response)
    }
}

/// Parse a model response as JSON, tolerating markdown code fences
pub fn parse_json_response(response: &str) -> Result<Value> {
    let mut cleaned = response.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    let cleaned = cleaned.trim().trim_end_matches("```").trim();

    serde_json::from_str(cleaned).with_context(|| {
        log::debug!("Unparseable model response: {}", response);
        "Failed to parse LLM response as JSON"
    })
}

/// Build the client selected by `config.llm.provider`
pub fn from_config(config: &Config) -> Result<Arc<dyn LlmClient>> {
    match config.llm.provider {
        LlmProvider::Mock => {
            log::info!("Using mock LLM - predefined responses");
            Ok(Arc::new(MockLlm::new()))
        }
        LlmProvider::OpenAi | LlmProvider::OpenRouter => {
            log::info!(
                "Using {} LLM - model {}",
                config.llm.provider,
                config.llm.model
            );
            Ok(Arc::new(OpenAiClient::from_config(&config.llm)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fenced_json() {
        let value = parse_json_response("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value, json!({"a": 1}));

        let value = parse_json_response("```\n[1, 2]\n```").unwrap();
        assert_eq!(value, json!([1, 2]));

        assert!(parse_json_response("not json").is_err());
    }

    #[tokio::test]
    async fn test_json_completion_lowers_temperature() {
        struct Recorder(std::sync::Mutex<Vec<(String, Option<f32>)>>);

        #[async_trait]
        impl LlmClient for Recorder {
            async fn chat(&self, system: &str, _: &str, temperature: Option<f32>) -> Result<String> {
                self.0.lock().unwrap().push((system.to_string(), temperature));
                Ok("```json\n{\"ok\": true}\n```".to_string())
            }
        }

        let llm = Recorder(Default::default());
        assert_eq!(llm.complete_json("Be brief", "hi").await.unwrap(), json!({"ok": true}));
        llm.complete("Be brief", "hi").await.unwrap();

        let calls = llm.0.lock().unwrap();
        assert!(calls[0].0.ends_with(JSON_INSTRUCTION));
        assert_eq!(calls[0].1, Some(JSON_TEMPERATURE));
        assert_eq!(calls[1], ("Be brief".to_string(), None));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        assert!(from_config(&config).is_ok());

        config.llm.provider = LlmProvider::OpenAi;
        assert!(from_config(&config).is_err());

        config.llm.api_key = Some("sk-test".to_string());
        assert!(from_config(&config).is_ok());

        config.llm.provider = LlmProvider::OpenRouter;
        assert!(from_config(&config).is_ok());
    }
}
