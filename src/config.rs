//! Configuration - YAML file with environment overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const LOCAL_CONFIG: &str = "agentflow.yml";

/// Which language model backend the agents talk to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Mock,
    OpenAi,
    OpenRouter,
}

impl Default for LlmProvider {
    fn default() -> Self {
        Self::Mock
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::OpenAi => write!(f, "openai"),
            Self::OpenRouter => write!(f, "openrouter"),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "openai" => Ok(Self::OpenAi),
            "openrouter" => Ok(Self::OpenRouter),
            other => anyhow::bail!("Unknown LLM provider: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    /// API root replacing the provider default, e.g. `http://localhost:11434/v1`
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Mock,
            api_key: None,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding product data files
    pub data: PathBuf,
    /// Directory the generated pages are written to
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data"),
            output: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub total_questions_target: usize,
    pub min_faq_items: usize,
    pub question_categories: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            total_questions_target: 15,
            min_faq_items: 5,
            question_categories: [
                "Informational",
                "Safety",
                "Usage",
                "Purchase",
                "Comparison",
                "Ingredients",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub paths: PathsConfig,
    pub app: AppConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Auto-detect and load configuration
    /// Priority:
    /// 1. ./agentflow.yml
    /// 2. <user config dir>/agentflow/config.yml
    /// 3. Built-in defaults
    ///
    /// Environment overrides are applied on top in every case.
    pub fn auto_load() -> Result<Self> {
        let mut config = match Self::search_path() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn search_path() -> Option<PathBuf> {
        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            return Some(local.to_path_buf());
        }

        dirs::config_dir()
            .map(|dir| dir.join("agentflow").join("config.yml"))
            .filter(|path| path.exists())
    }

    /// Apply `LLM_PROVIDER`, `LLM_API_KEY`/`OPENAI_API_KEY`, `LLM_MODEL`,
    /// `LLM_BASE_URL` and `OUTPUT_DIR` from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(key) = lookup("LLM_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(base_url) = lookup("LLM_BASE_URL").filter(|url| !url.is_empty()) {
            self.llm.base_url = Some(base_url);
        }
        if let Some(output) = lookup("OUTPUT_DIR") {
            self.paths.output = PathBuf::from(output);
        }
        Ok(())
    }

    /// Check required settings for the selected provider
    pub fn validate(&self) -> Result<()> {
        if self.llm.provider == LlmProvider::Mock {
            log::warn!("Running in MOCK mode - no API calls will be made");
            return Ok(());
        }

        if self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            anyhow::bail!(
                "LLM_API_KEY or OPENAI_API_KEY is required for provider {}; use LLM_PROVIDER=mock for testing",
                self.llm.provider
            );
        }
        Ok(())
    }

    /// Default product data file inside the data directory
    pub fn product_data_path(&self) -> PathBuf {
        self.paths.data.join("productData.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.provider, LlmProvider::Mock);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.app.total_questions_target, 15);
        assert_eq!(config.app.question_categories.len(), 6);
        assert_eq!(config.product_data_path(), PathBuf::from("data/productData.json"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "llm:\n  provider: openrouter\n  model: some-model\npaths:\n  output: out").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::OpenRouter);
        assert_eq!(config.llm.model, "some-model");
        assert_eq!(config.llm.max_tokens, 2000);
        assert_eq!(config.paths.output, PathBuf::from("out"));
        assert_eq!(config.paths.data, PathBuf::from("data"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("LLM_PROVIDER", "OpenAI"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OUTPUT_DIR", "pages"),
            ("LLM_BASE_URL", "http://localhost:11434/v1"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.paths.output, PathBuf::from("pages"));
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = Config::default();
        assert!(config
            .apply_env(|key| (key == "LLM_PROVIDER").then(|| "gemini".to_string()))
            .is_err());
    }

    #[test]
    fn test_validate_requires_key_outside_mock() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.llm.provider = LlmProvider::OpenAi;
        assert!(config.validate().is_err());
    }
}
