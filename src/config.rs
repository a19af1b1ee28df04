//! Configuration for the evaluator.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{RagEvalError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name (e.g., "gpt-4", "claude-3-opus")
    pub model: String,

    /// Maximum tokens for response (optional)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (optional)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: String::new(),
            model: "claude-latest".to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Embedding API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL for the embedding API. Falls back to the LLM base URL
    /// when empty.
    pub api_base: String,

    /// API key for the embedding API. Falls back to the LLM key when empty.
    pub api_key: String,

    /// Embedding model name (e.g., "text-embedding-3-small")
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: String::new(),
            model: "text-embedding-3-small".to_string(),
        }
    }
}

/// Scoring parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Number of questions regenerated per answer for Answer Relevancy.
    /// Ideal range is 3 to 5.
    #[serde(default = "default_strictness")]
    pub strictness: usize,
}

fn default_strictness() -> usize {
    3
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            strictness: default_strictness(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,
    /// Embedding API settings
    pub embedding: EmbeddingConfig,
    /// Scoring parameters
    pub eval: EvalConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    embedding: Option<EmbeddingFileSection>,
    eval: Option<EvalFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EvalFileSection {
    strictness: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_API_BASE, LLM_API_KEY, LLM_MODEL, ...)
    /// 2. Config file (~/.config/rag-evaluator/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file first
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        // Override with environment variables
        if let Ok(api_base) = env::var("LLM_API_BASE") {
            config.llm.api_base = api_base;
        }

        if let Ok(api_key) = env::var("LLM_API_KEY") {
            config.llm.api_key = api_key;
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            config.llm.model = model;
        }

        if let Ok(max_tokens) = env::var("LLM_MAX_TOKENS") {
            if let Ok(tokens) = max_tokens.parse() {
                config.llm.max_tokens = tokens;
            }
        }

        if let Ok(temperature) = env::var("LLM_TEMPERATURE") {
            if let Ok(temp) = temperature.parse() {
                config.llm.temperature = temp;
            }
        }

        if let Ok(api_base) = env::var("EMBEDDING_API_BASE") {
            config.embedding.api_base = api_base;
        }

        if let Ok(api_key) = env::var("EMBEDDING_API_KEY") {
            config.embedding.api_key = api_key;
        }

        if let Ok(model) = env::var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }

        if let Ok(strictness) = env::var("EVAL_STRICTNESS") {
            if let Ok(n) = strictness.parse() {
                config.eval.strictness = n;
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RagEvalError::io(path, e))?;

        let file_config: ConfigFile = serde_yaml::from_str(&content)
            .map_err(|e| RagEvalError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
        }

        if let Some(embedding) = file_config.embedding {
            if let Some(api_base) = embedding.api_base {
                config.embedding.api_base = api_base;
            }
            if let Some(api_key) = embedding.api_key {
                config.embedding.api_key = api_key;
            }
            if let Some(model) = embedding.model {
                config.embedding.model = model;
            }
        }

        if let Some(eval) = file_config.eval {
            if let Some(strictness) = eval.strictness {
                config.eval.strictness = strictness;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rag-evaluator")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_base.is_empty() {
            return Err(RagEvalError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.api_key.is_empty() {
            return Err(RagEvalError::Config(
                "LLM API key is required. Set LLM_API_KEY environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.model.is_empty() {
            return Err(RagEvalError::Config(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        if self.eval.strictness == 0 {
            return Err(RagEvalError::Config(
                "Strictness must be at least 1.".to_string(),
            ));
        }

        Ok(())
    }

    /// Embedding settings with LLM fallbacks applied. The embedding API
    /// defaults to the same endpoint and key as the chat API.
    pub fn resolved_embedding(&self) -> EmbeddingConfig {
        let mut embedding = self.embedding.clone();
        if embedding.api_base.is_empty() {
            embedding.api_base = self.llm.api_base.clone();
        }
        if embedding.api_key.is_empty() {
            embedding.api_key = self.llm.api_key.clone();
        }
        embedding
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.llm.api_base.is_empty());
        assert!(config.llm.api_key.is_empty());
        assert_eq!(config.llm.model, "claude-latest");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.eval.strictness, 3);
    }

    #[test]
    fn test_validate_fails_without_required_fields() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_llm() {
        let config = Config::with_llm("https://api.example.com", "test-key", "gpt-4");
        assert_eq!(config.llm.api_base, "https://api.example.com");
        assert_eq!(config.llm.api_key, "test-key");
        assert_eq!(config.llm.model, "gpt-4");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_embedding_falls_back_to_llm_endpoint() {
        let config = Config::with_llm("https://api.example.com", "test-key", "gpt-4");
        let embedding = config.resolved_embedding();
        assert_eq!(embedding.api_base, "https://api.example.com");
        assert_eq!(embedding.api_key, "test-key");
        assert_eq!(embedding.model, "text-embedding-3-small");
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "llm:\n  api_base: https://api.example.com\n  api_key: file-key\n  model: gpt-4\neval:\n  strictness: 5\n"
        )
        .unwrap();

        let config = Config::load_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.llm.api_base, "https://api.example.com");
        assert_eq!(config.eval.strictness, 5);
    }
}
