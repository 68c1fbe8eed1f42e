//! Hugging Face clients
//!
//! The serverless Inference API (raw text generation) and the router's
//! OpenAI-style Responses API.
//!
//! https://huggingface.co/docs/inference-providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{check_status, GenerationOptions, GenerationRequest, LlmClient, Provider};
use crate::predict::response::strip_prompt_echo;
use crate::{MatchdayError, Result};

/// Serverless Inference API client
pub struct HuggingFaceInference {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    options: GenerationOptions,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct Generated {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<Generated>),
    Single(Generated),
}

impl InferenceResponse {
    fn into_text(self) -> Option<String> {
        match self {
            InferenceResponse::Batch(batch) => batch.into_iter().next().map(|g| g.generated_text),
            InferenceResponse::Single(single) => Some(single.generated_text),
        }
    }
}

impl HuggingFaceInference {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        options: GenerationOptions,
    ) -> Self {
        HuggingFaceInference {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            options,
        }
    }

    /// Text-generation models take one string, so the system prompt leads it
    fn inputs(request: &GenerationRequest) -> String {
        match &request.system {
            Some(system) => format!("{}\n\n{}", system, request.prompt),
            None => request.prompt.clone(),
        }
    }

    fn body<'a>(&self, inputs: &'a str) -> InferenceRequest<'a> {
        InferenceRequest {
            inputs,
            parameters: InferenceParameters {
                max_new_tokens: self.options.max_tokens,
                temperature: self.options.temperature,
                top_p: self.options.top_p,
                do_sample: true,
                return_full_text: true,
            },
        }
    }
}

#[async_trait]
impl LlmClient for HuggingFaceInference {
    fn provider(&self) -> Provider {
        Provider::HuggingFace
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let inputs = Self::inputs(request);
        let url = format!("{}/models/{}", self.base_url, self.model);

        let mut builder = self
            .client
            .post(&url)
            .timeout(self.options.timeout)
            .json(&self.body(&inputs));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = check_status(Provider::HuggingFace, builder.send().await?).await?;
        let parsed: InferenceResponse = response.json().await?;

        let text = parsed
            .into_text()
            .ok_or(MatchdayError::EmptyResponse(Provider::HuggingFace))?;
        let text = strip_prompt_echo(&text, &inputs);
        if text.is_empty() {
            return Err(MatchdayError::EmptyResponse(Provider::HuggingFace));
        }
        Ok(text.to_string())
    }
}

/// Router client for the Responses API
pub struct HuggingFaceRouter {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    options: GenerationOptions,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    /// First `output_text` block of the first assistant message
    fn into_text(self) -> Option<String> {
        self.output
            .into_iter()
            .filter(|item| item.kind == "message" && item.role.as_deref() == Some("assistant"))
            .flat_map(|item| item.content)
            .find(|block| block.kind == "output_text")
            .and_then(|block| block.text)
    }
}

impl HuggingFaceRouter {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        HuggingFaceRouter {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            options,
        }
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest) -> ResponsesRequest<'a> {
        let mut input = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            input.push(InputMessage {
                role: "system",
                content: system,
            });
        }
        input.push(InputMessage {
            role: "user",
            content: &request.prompt,
        });

        ResponsesRequest {
            model: &self.model,
            input,
            max_output_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        }
    }
}

#[async_trait]
impl LlmClient for HuggingFaceRouter {
    fn provider(&self) -> Provider {
        Provider::HuggingFaceRouter
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = self.body(request);

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("Responses API payload: {}", json);
            }
        }

        let response = self
            .client
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.options.timeout)
            .json(&body)
            .send()
            .await?;
        let response = check_status(Provider::HuggingFaceRouter, response).await?;

        let parsed: ResponsesResponse = response.json().await?;
        parsed
            .into_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(MatchdayError::EmptyResponse(Provider::HuggingFaceRouter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn options() -> GenerationOptions {
        GenerationOptions {
            max_tokens: 300,
            temperature: 0.7,
            top_p: 0.9,
            timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_inference_body() {
        let client = HuggingFaceInference::new(
            reqwest::Client::new(),
            "https://api-inference.huggingface.co",
            "gpt2-medium",
            None,
            options(),
        );
        let request = GenerationRequest::new("Who wins?").with_system("Be brief.");
        let inputs = HuggingFaceInference::inputs(&request);
        let body = serde_json::to_value(client.body(&inputs)).unwrap();

        assert_eq!(body["inputs"], "Be brief.\n\nWho wins?");
        assert_eq!(body["parameters"]["max_new_tokens"], 300);
        assert_eq!(body["parameters"]["return_full_text"], true);
        assert_eq!(body["parameters"]["do_sample"], true);
    }

    #[test]
    fn test_inference_response_shapes() {
        let batch: InferenceResponse =
            serde_json::from_value(json!([{"generated_text": "Arsenal"}])).unwrap();
        assert_eq!(batch.into_text().as_deref(), Some("Arsenal"));

        let single: InferenceResponse =
            serde_json::from_value(json!({"generated_text": "Draw"})).unwrap();
        assert_eq!(single.into_text().as_deref(), Some("Draw"));

        let empty: InferenceResponse = serde_json::from_value(json!([])).unwrap();
        assert_eq!(empty.into_text(), None);

        assert!(serde_json::from_value::<InferenceResponse>(json!({"error": "loading"})).is_err());
    }

    #[test]
    fn test_router_body() {
        let client = HuggingFaceRouter::new(
            reqwest::Client::new(),
            "https://router.huggingface.co",
            "openai/gpt-oss-120b:fastest",
            "key",
            options(),
        );
        let request = GenerationRequest::new("Hello").with_system("You are helpful.");
        let body = serde_json::to_value(client.body(&request)).unwrap();

        assert_eq!(body["model"], "openai/gpt-oss-120b:fastest");
        assert_eq!(body["input"][0], json!({"role": "system", "content": "You are helpful."}));
        assert_eq!(body["input"][1], json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn test_router_response_text() {
        let parsed: ResponsesResponse = serde_json::from_value(json!({
            "output": [
                {"type": "reasoning", "content": [{"type": "reasoning_text", "text": "thinking"}]},
                {
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        {"type": "refusal"},
                        {"type": "output_text", "text": "## Services"}
                    ]
                }
            ]
        }))
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("## Services"));

        let nothing: ResponsesResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(nothing.into_text(), None);
    }
}
