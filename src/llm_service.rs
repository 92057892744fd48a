use async_trait::async_trait;
use std::time::Duration;

use crate::error::{EnrichError, Result};
use crate::llm_config::LLMProviderConfig;
use crate::traits::Classifier;

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const TEMPERATURE: f64 = 0.1;

/// Completion client for a single provider.
///
/// Each call is one request with no retry; rate limits and timeouts
/// surface as errors to the caller.
pub struct LLMServiceClient {
    config: LLMProviderConfig,
    http_client: reqwest::Client,
    name: String,
}

impl LLMServiceClient {
    pub fn new(config: LLMProviderConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let name = format!("{}/{}", config.provider, config.model);
        tracing::info!(
            "🤖 LLM Service configured: {} (timeout {}s)",
            name,
            config.timeout_secs
        );

        Ok(Self {
            config,
            http_client,
            name,
        })
    }

    pub fn config(&self) -> &LLMProviderConfig {
        &self.config
    }

    fn base_url(&self, default: &str) -> String {
        self.config
            .endpoint
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| EnrichError::Config(format!("{} API key not configured", self.config.provider)))
    }

    /// Send the request and decode the JSON body, mapping HTTP failures.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<serde_json::Value> {
        let response = request.send().await.map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_transport_error(e))?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichError::RateLimited { message: body });
        }
        if !status.is_success() {
            return Err(EnrichError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| EnrichError::Api {
            status: status.as_u16(),
            message: format!("invalid JSON body: {}", e),
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> EnrichError {
        if e.is_timeout() {
            EnrichError::Timeout {
                secs: self.config.timeout_secs,
            }
        } else {
            EnrichError::Http(e)
        }
    }

    async fn call_openai(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key()?;

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": self.config.max_tokens
        });

        let response_json = self
            .send(
                self.http_client
                    .post(format!("{}/v1/chat/completions", self.base_url(OPENAI_BASE_URL)))
                    .header("Authorization", format!("Bearer {}", api_key))
                    .json(&request_body),
            )
            .await?;

        response_json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(EnrichError::EmptyCompletion)
    }

    async fn call_anthropic(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key()?;

        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": TEMPERATURE,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response_json = self
            .send(
                self.http_client
                    .post(format!("{}/v1/messages", self.base_url(ANTHROPIC_BASE_URL)))
                    .header("x-api-key", api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&request_body),
            )
            .await?;

        response_json
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
            })
            .and_then(|b| b.get("text"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(EnrichError::EmptyCompletion)
    }

    async fn call_ollama(&self, prompt: &str) -> Result<String> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or_else(|| EnrichError::Config("Ollama endpoint not configured".to_string()))?;

        let request_body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": TEMPERATURE,
            }
        });

        let response_json = self
            .send(
                self.http_client
                    .post(format!("{}/api/generate", endpoint.trim_end_matches('/')))
                    .json(&request_body),
            )
            .await?;

        response_json
            .get("response")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(EnrichError::EmptyCompletion)
    }
}

#[async_trait]
impl Classifier for LLMServiceClient {
    async fn classify(&self, prompt: &str) -> Result<String> {
        tracing::debug!("Sending {} byte prompt to {}", prompt.len(), self.name);

        let text = match self.config.provider.as_str() {
            "openai" => self.call_openai(prompt).await?,
            "anthropic" => self.call_anthropic(prompt).await?,
            "ollama" => self.call_ollama(prompt).await?,
            other => return Err(EnrichError::UnsupportedProvider(other.to_string())),
        };

        if text.trim().is_empty() {
            return Err(EnrichError::EmptyCompletion);
        }

        tracing::debug!("Received {} bytes from {}", text.len(), self.name);
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
