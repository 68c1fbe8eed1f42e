//! Service assistant
//!
//! Chat replies about the company's services. Identity and off-topic
//! questions are answered locally; everything else goes to the model with a
//! fixed system prompt.

use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::llm::{GenerationRequest, LlmClient};
use crate::predict::prompt::assistant_system_prompt;
use crate::{AssistantConfig, MatchdayError, Result};

const IDENTITY_PATTERN: &str = r"(who (are|made|created|built|trained) you|what are you|where are you from|wewe ni nani|nani alikutengeneza|nani developer|uliumbwa na nani)";

pub struct Assistant {
    config: AssistantConfig,
    llm: Option<Arc<dyn LlmClient>>,
    system_prompt: String,
    identity: Regex,
    out_of_scope: Option<Regex>,
    contact_keywords: Option<Regex>,
}

/// Case-insensitive alternation over literal keywords
fn keyword_regex(words: &[String]) -> Result<Option<Regex>> {
    let words: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    if words.is_empty() {
        return Ok(None);
    }

    RegexBuilder::new(&format!(r"\b({})\b", words.join("|")))
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| MatchdayError::Config(format!("invalid assistant keyword: {}", e)))
}

impl Assistant {
    /// Build an assistant; without a model it answers from the service list
    pub fn new(config: AssistantConfig, llm: Option<Arc<dyn LlmClient>>) -> Result<Self> {
        let identity = RegexBuilder::new(IDENTITY_PATTERN)
            .case_insensitive(true)
            .build()
            .map_err(|e| MatchdayError::Config(e.to_string()))?;

        Ok(Assistant {
            system_prompt: assistant_system_prompt(&config),
            out_of_scope: keyword_regex(&config.out_of_scope)?,
            contact_keywords: keyword_regex(&config.contact_keywords)?,
            identity,
            config,
            llm,
        })
    }

    /// Answer one chat message
    pub async fn reply(&self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(MatchdayError::InvalidRequest("prompt must not be empty".to_string()));
        }

        if self.identity.is_match(message) {
            log::debug!("Identity question answered locally");
            return Ok(self.identity_reply());
        }

        if self
            .out_of_scope
            .as_ref()
            .is_some_and(|re| re.is_match(message))
        {
            log::debug!("Off-topic question answered locally");
            return Ok(self.out_of_scope_reply());
        }

        let reply = match &self.llm {
            Some(llm) => {
                let request =
                    GenerationRequest::new(message).with_system(self.system_prompt.clone());
                match llm.generate(&request).await {
                    Ok(text) if !text.trim().is_empty() => text,
                    Ok(_) | Err(MatchdayError::EmptyResponse(_)) => self.fallback_reply(),
                    Err(e) => return Err(e),
                }
            }
            None => self.services_reply(),
        };

        Ok(self.with_contact(message, reply))
    }

    /// Append the contact line when the customer asks for it and it is missing
    fn with_contact(&self, message: &str, reply: String) -> String {
        let asked = self
            .contact_keywords
            .as_ref()
            .is_some_and(|re| re.is_match(message));

        if asked && !reply.contains(&self.config.contact) {
            format!("{}\n\n📞 {}", reply.trim_end(), self.config.contact)
        } else {
            reply
        }
    }

    fn identity_reply(&self) -> String {
        format!(
            "## 🤖 {}\nI am **{}**, built by **{}** to help with {} services.",
            self.config.company, self.config.name, self.config.developer, self.config.company
        )
    }

    fn out_of_scope_reply(&self) -> String {
        format!(
            "### ❌ We don't offer that\n{} focuses on **technology services only**.\n\n📲 {}",
            self.config.company, self.config.contact
        )
    }

    fn services_reply(&self) -> String {
        let services: String = self
            .config
            .services
            .iter()
            .map(|s| format!("- {}\n", s))
            .collect();
        format!(
            "### 🚀 {} Services\n\n{}\n📞 {}",
            self.config.company, services, self.config.contact
        )
    }

    fn fallback_reply(&self) -> String {
        format!(
            "### 📌 {}\nFor all our technology services, reach us on {}.",
            self.config.company, self.config.contact
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testutil::StubLlm;

    fn assistant(llm: Option<Arc<StubLlm>>) -> Assistant {
        let llm = llm.map(|l| l as Arc<dyn LlmClient>);
        Assistant::new(AssistantConfig::default(), llm).unwrap()
    }

    #[tokio::test]
    async fn test_identity_intercepted() {
        let llm = Arc::new(StubLlm::replying("I am a large language model"));
        let assistant = assistant(Some(llm.clone()));

        for question in ["Who made you?", "WEWE NI NANI", "what are you exactly"] {
            let reply = assistant.reply(question).await.unwrap();
            assert!(reply.contains("Matchday Assistant"), "{}", question);
        }
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_out_of_scope_intercepted() {
        let llm = Arc::new(StubLlm::replying("unused"));
        let assistant = assistant(Some(llm.clone()));

        let reply = assistant.reply("Give me a betting tip").await.unwrap();
        assert!(reply.contains("We don't offer that"));
        assert!(reply.contains("255745720609"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_keyword_needs_word_boundary() {
        let llm = Arc::new(StubLlm::replying("We build websites."));
        let assistant = assistant(Some(llm.clone()));

        // "dini" inside another word is not an off-topic keyword
        assistant.reply("Can you build a website for Dinisha?").await.unwrap();
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_forwards_with_system_prompt() {
        let llm = Arc::new(StubLlm::replying("We build websites."));
        let assistant = assistant(Some(llm.clone()));

        let reply = assistant.reply("  Do you build websites?  ").await.unwrap();
        assert_eq!(reply, "We build websites.");

        let requests = llm.requests();
        assert_eq!(requests[0].prompt, "Do you build websites?");
        assert!(requests[0]
            .system
            .as_deref()
            .unwrap()
            .starts_with("You are Matchday Assistant."));
    }

    #[tokio::test]
    async fn test_contact_injected_on_price_question() {
        let llm = Arc::new(StubLlm::replying("Websites start at 49,000 TZS."));
        let reply = assistant(Some(llm))
            .reply("What is the price of a website?")
            .await
            .unwrap();

        assert!(reply.starts_with("Websites start at 49,000 TZS."));
        assert!(reply.ends_with("WhatsApp: 255745720609"));
    }

    #[tokio::test]
    async fn test_contact_not_duplicated() {
        let llm = Arc::new(StubLlm::replying("Contact us on WhatsApp: 255745720609"));
        let reply = assistant(Some(llm)).reply("How do I contact you?").await.unwrap();
        assert_eq!(reply.matches("255745720609").count(), 1);
    }

    #[tokio::test]
    async fn test_blank_model_reply_falls_back() {
        let llm = Arc::new(StubLlm::replying("   "));
        let reply = assistant(Some(llm)).reply("Tell me about apps").await.unwrap();
        assert!(reply.contains("reach us on WhatsApp: 255745720609"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let llm = Arc::new(StubLlm::failing());
        let err = assistant(Some(llm)).reply("Tell me about apps").await.unwrap_err();
        assert!(matches!(err, MatchdayError::Provider { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_without_model_lists_services() {
        let reply = assistant(None).reply("What do you do?").await.unwrap();
        assert!(reply.contains("- Graphic design"));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let err = assistant(None).reply("   ").await.unwrap_err();
        assert!(matches!(err, MatchdayError::InvalidRequest(_)));
    }
}
