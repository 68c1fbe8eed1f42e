//! Shared test doubles for code that talks to a model.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationRequest, LlmClient, Provider};
use crate::{MatchdayError, Result};

/// Model stand-in that replays a fixed answer and records every request.
pub struct StubLlm {
    reply: Option<String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubLlm {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a 503 from the provider
    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().ok_or(MatchdayError::Provider {
            provider: Provider::OpenAi,
            status: 503,
            body: "model is overloaded".to_string(),
        })
    }
}
