//! Google Gemini client (`generateContent`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{check_status, GenerationOptions, GenerationRequest, LlmClient, Provider};
use crate::{MatchdayError, Result};

pub struct Gemini {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    options: GenerationOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, concatenated
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl Gemini {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        Gemini {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            options,
        }
    }

    fn body<'a>(&self, request: &'a GenerationRequest) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: request.system.as_deref().map(|system| Content {
                role: None,
                parts: vec![Part { text: system }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.options.max_tokens,
                temperature: self.options.temperature,
                top_p: self.options.top_p,
            },
        }
    }
}

#[async_trait]
impl LlmClient for Gemini {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .timeout(self.options.timeout)
            .json(&self.body(request))
            .send()
            .await?;
        let response = check_status(Provider::Gemini, response).await?;

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .into_text()
            .ok_or(MatchdayError::EmptyResponse(Provider::Gemini))
    }
}
