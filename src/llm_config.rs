use crate::error::{EnrichError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the completion provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LLMProviderConfig {
    pub provider: String, // "openai", "anthropic" or "ollama"
    pub model: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>, // Base URL override; required for Ollama
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for LLMProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            api_key: None,
            endpoint: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LLMProviderConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for variable access
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // A JSON config file takes precedence over individual variables
        if let Some(config_path) = lookup("LLM_CONFIG_FILE") {
            let config_str = std::fs::read_to_string(&config_path)
                .map_err(|e| EnrichError::Config(format!("cannot read {}: {}", config_path, e)))?;
            return serde_json::from_str(&config_str)
                .map_err(|e| EnrichError::Config(format!("invalid {}: {}", config_path, e)));
        }

        let provider = lookup("LLM_PROVIDER").unwrap_or_else(|| "openai".to_string());
        let model = lookup("LLM_MODEL").unwrap_or_else(|| {
            // Provide sensible defaults based on provider
            match provider.as_str() {
                "anthropic" => "claude-3-5-sonnet-20240620".to_string(),
                "ollama" => "llama3".to_string(),
                _ => "gpt-4".to_string(),
            }
        });

        let timeout_secs = match lookup("LLM_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| EnrichError::Config(format!("LLM_TIMEOUT_SECS must be an integer, got '{}'", v)))?,
            None => default_timeout_secs(),
        };

        let max_tokens = match lookup("LLM_MAX_TOKENS") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| EnrichError::Config(format!("LLM_MAX_TOKENS must be an integer, got '{}'", v)))?,
            None => default_max_tokens(),
        };

        let endpoint = lookup("LLM_ENDPOINT").or_else(|| {
            (provider == "ollama").then(|| "http://localhost:11434".to_string())
        });

        Ok(Self {
            provider,
            model,
            api_key: lookup("LLM_API_KEY"),
            endpoint,
            timeout_secs,
            max_tokens,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.provider.as_str() {
            "openai" | "anthropic" => {
                if self.api_key.as_deref().map_or(true, str::is_empty) {
                    return Err(EnrichError::Config(format!(
                        "LLM_API_KEY is required for provider '{}'",
                        self.provider
                    )));
                }
            }
            "ollama" => {
                if self.endpoint.is_none() {
                    return Err(EnrichError::Config("Ollama endpoint not configured".to_string()));
                }
            }
            other => return Err(EnrichError::UnsupportedProvider(other.to_string())),
        }

        if self.timeout_secs == 0 {
            return Err(EnrichError::Config("timeout_secs must be at least 1".to_string()));
        }

        Ok(())
    }

    /// API key with everything past the first 4 characters masked
    pub fn masked_api_key(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}***", key.chars().take(4).collect::<String>()),
            None => "<unset>".to_string(),
        }
    }
}
