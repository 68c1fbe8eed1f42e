//! Hosted language model clients
//!
//! One trait, one implementation per wire format. Every call is a single
//! HTTPS request with a timeout and no retries.

pub mod gemini;
pub mod huggingface;
pub mod openai;

#[cfg(test)]
pub(crate) mod testutil;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{LlmConfig, MatchdayError, Result};

pub use gemini::Gemini;
pub use huggingface::{HuggingFaceInference, HuggingFaceRouter};
pub use openai::OpenAiChat;

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// Hugging Face serverless Inference API (text generation)
    #[serde(rename = "huggingface")]
    HuggingFace,
    /// Hugging Face router, Responses API
    #[serde(rename = "hf-router")]
    HuggingFaceRouter,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "gemini")]
    Gemini,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "huggingface",
            Provider::HuggingFaceRouter => "hf-router",
            Provider::OpenAi => "openai",
            Provider::DeepSeek => "deepseek",
            Provider::Gemini => "gemini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "https://api-inference.huggingface.co",
            Provider::HuggingFaceRouter => "https://router.huggingface.co",
            Provider::OpenAi => "https://api.openai.com",
            Provider::DeepSeek => "https://api.deepseek.com",
            Provider::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    /// The public Inference API serves some models anonymously
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::HuggingFace)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single prompt to send
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerationRequest {
            system: None,
            prompt: prompt.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Sampling settings shared by all providers
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout: Duration,
}

impl From<&LlmConfig> for GenerationOptions {
    fn from(config: &LlmConfig) -> Self {
        GenerationOptions {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// A hosted model that turns a prompt into text
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    fn model(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Construct the client for the configured provider
pub fn build_client(
    config: &LlmConfig,
    api_key: Option<String>,
    http: reqwest::Client,
) -> Result<Arc<dyn LlmClient>> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| config.provider.default_base_url().to_string());
    let base_url = base_url.trim_end_matches('/').to_string();
    let options = GenerationOptions::from(config);
    let model = config.model.clone();

    let key = || {
        api_key.clone().ok_or_else(|| {
            MatchdayError::Config(format!("provider {} needs an API key", config.provider))
        })
    };

    let client: Arc<dyn LlmClient> = match config.provider {
        Provider::HuggingFace => Arc::new(HuggingFaceInference::new(
            http,
            base_url,
            model,
            api_key.clone(),
            options,
        )),
        Provider::HuggingFaceRouter => Arc::new(HuggingFaceRouter::new(
            http, base_url, model, key()?, options,
        )),
        Provider::OpenAi | Provider::DeepSeek => Arc::new(OpenAiChat::new(
            config.provider,
            http,
            base_url,
            model,
            key()?,
            options,
        )),
        Provider::Gemini => Arc::new(Gemini::new(http, base_url, model, key()?, options)),
    };

    log::info!("Using {} model {}", client.provider(), client.model());
    Ok(client)
}

/// Turn a non-success response into a provider error carrying its body
pub(crate) async fn check_status(
    provider: Provider,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    log::debug!("{} HTTP status: {}", provider, status);

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::warn!("{} request failed with {}: {}", provider, status, body);
    Err(MatchdayError::Provider {
        provider,
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names_round_trip_through_config() {
        for provider in [
            Provider::HuggingFace,
            Provider::HuggingFaceRouter,
            Provider::OpenAi,
            Provider::DeepSeek,
            Provider::Gemini,
        ] {
            let quoted = serde_json::to_string(&provider).unwrap();
            assert_eq!(quoted, format!("\"{}\"", provider.name()));
        }
    }

    #[test]
    fn test_build_client_requires_key() {
        let config = LlmConfig {
            provider: Provider::Gemini,
            model: "gemini-1.5-flash".to_string(),
            ..LlmConfig::default()
        };
        let result = build_client(&config, None, reqwest::Client::new());
        assert!(matches!(result, Err(MatchdayError::Config(_))));
    }

    #[test]
    fn test_build_client_selects_provider() {
        let config = LlmConfig {
            provider: Provider::DeepSeek,
            model: "deepseek-chat".to_string(),
            base_url: Some("http://localhost:9000/".to_string()),
            ..LlmConfig::default()
        };
        let client =
            build_client(&config, Some("key".to_string()), reqwest::Client::new()).unwrap();
        assert_eq!(client.provider(), Provider::DeepSeek);
        assert_eq!(client.model(), "deepseek-chat");

        let anonymous = build_client(&LlmConfig::default(), None, reqwest::Client::new()).unwrap();
        assert_eq!(anonymous.provider(), Provider::HuggingFace);
    }
}
