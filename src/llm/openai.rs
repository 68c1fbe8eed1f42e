//! Chat Completions client
//!
//! Serves both OpenAI and DeepSeek, which share the wire format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{check_status, GenerationOptions, GenerationRequest, LlmClient, Provider};
use crate::{MatchdayError, Result};

pub struct OpenAiChat {
    provider: Provider,
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    options: GenerationOptions,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
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

impl ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
    }
}

impl OpenAiChat {
    pub fn new(
        provider: Provider,
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        OpenAiChat {
            provider,
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            options,
        }
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            top_p: self.options.top_p,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiChat {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = self.body(request);

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("{} request payload: {}", self.provider, json);
            }
        }

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.options.timeout)
            .json(&body)
            .send()
            .await?;
        let response = check_status(self.provider, response).await?;

        let parsed: ChatResponse = response.json().await?;
        parsed
            .into_text()
            .ok_or(MatchdayError::EmptyResponse(self.provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn client(provider: Provider) -> OpenAiChat {
        OpenAiChat::new(
            provider,
            reqwest::Client::new(),
            provider.default_base_url(),
            "gpt-4o-mini",
            "sk-test",
            GenerationOptions {
                max_tokens: 200,
                temperature: 0.2,
                top_p: 1.0,
                timeout: Duration::from_secs(30),
            },
        )
    }

    #[test]
    fn test_body_without_system() {
        let chat = client(Provider::OpenAi);
        let request = GenerationRequest::new("Who wins?");
        let body = serde_json::to_value(chat.body(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"], json!([{"role": "user", "content": "Who wins?"}]));
        assert_eq!(body["max_tokens"], 200);
    }

    #[test]
    fn test_body_with_system() {
        let chat = client(Provider::DeepSeek);
        let request = GenerationRequest::new("Hi").with_system("Be terse.");
        let body = serde_json::to_value(chat.body(&request)).unwrap();

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hi");
        assert_eq!(chat.provider(), Provider::DeepSeek);
    }

    #[test]
    fn test_response_text() {
        let parsed: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Arsenal 2-1"}}]
        }))
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Arsenal 2-1"));

        let blank: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "  "}}]
        }))
        .unwrap();
        assert_eq!(blank.into_text(), None);

        let none: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(none.into_text(), None);
    }
}
