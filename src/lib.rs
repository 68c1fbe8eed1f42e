//! Match prediction service
//!
//! Computes recent team form from match history, renders it into a prompt and
//! forwards the prompt to a hosted language model.

pub mod assistant;
pub mod data;
pub mod features;
pub mod llm;
pub mod predict;
pub mod server;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use features::form::{TeamMatching, DEFAULT_WINDOW};
use llm::Provider;

/// Which side of a fixture a team played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Home => write!(f, "home"),
            Side::Away => write!(f, "away"),
        }
    }
}

/// A single historical fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub home_rating: f64,
    pub away_rating: f64,
}

impl MatchRecord {
    /// Side the given team played on, or None if it did not take part
    pub fn side_of(&self, team: &str, matching: TeamMatching) -> Option<Side> {
        if matching.matches(&self.home_team, team) {
            Some(Side::Home)
        } else if matching.matches(&self.away_team, team) {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Goals scored by the given side
    pub fn score_for(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    /// Goals conceded by the given side
    pub fn score_against(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.away_score,
            Side::Away => self.home_score,
        }
    }

    /// Strength index of the given side at the time of the match
    pub fn rating_for(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.home_rating,
            Side::Away => self.away_rating,
        }
    }

    /// Check if the given side won outright
    pub fn did_win(&self, side: Side) -> bool {
        self.score_for(side) > self.score_against(side)
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum MatchdayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No recorded matches for team: {0}")]
    UnknownTeam(String),

    #[error("Match not found in current data: {home} vs {away}")]
    MatchNotFound { home: String, away: String },

    #[error("Failed to fetch live match data: {0}")]
    FeedUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{provider} returned {status}: {body}")]
    Provider {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("{0} returned no text")]
    EmptyResponse(Provider),
}

pub type Result<T> = std::result::Result<T, MatchdayError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Match history CSV, either a file path or an http(s) URL
    pub history: String,
    /// Live fixtures JSON feed
    pub feed_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub window: usize,
    pub matching: TeamMatching,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub name: String,
    pub developer: String,
    pub company: String,
    /// Contact line appended to pricing and contact questions
    pub contact: String,
    pub services: Vec<String>,
    pub out_of_scope: Vec<String>,
    pub contact_keywords: Vec<String>,
    /// Forward chat to the model; when off, answers come from the canned replies
    pub use_model: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            provider: Provider::HuggingFace,
            model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            api_key_env: "HUGGINGFACE_API_KEY".to_string(),
            base_url: None,
            max_tokens: 300,
            temperature: 0.7,
            top_p: 0.9,
            timeout_secs: 60,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            history: "data/matches.csv".to_string(),
            feed_url: "https://api.sportsrc.org/?data=matches&category=football".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            window: DEFAULT_WINDOW,
            matching: TeamMatching::default(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        let words =
            |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        AssistantConfig {
            name: "Matchday Assistant".to_string(),
            developer: "the Matchday team".to_string(),
            company: "Matchday".to_string(),
            contact: "WhatsApp: 255745720609".to_string(),
            services: words(&[
                "Web development",
                "Mobile app development",
                "Graphic design",
                "Payment numbers and agent lines",
            ]),
            out_of_scope: words(&[
                "politics", "siasa", "romance", "mapenzi", "music", "muziki", "movie", "religion",
                "dini", "betting", "prediction",
            ]),
            contact_keywords: words(&[
                "price", "cost", "contact", "whatsapp", "phone", "bei", "gharama", "wasiliana",
            ]),
            use_model: true,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MatchdayError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| MatchdayError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MatchdayError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply process environment overrides (currently only `PORT`)
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| MatchdayError::Config(format!("PORT is not a valid port: {}", port)))?;
        }
        Ok(())
    }

    /// Read the provider API key from the configured environment variable.
    ///
    /// Returns `Ok(None)` when the key is absent and the provider can run
    /// without one.
    pub fn api_key(&self) -> Result<Option<String>> {
        match std::env::var(&self.llm.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
            _ if self.llm.provider.requires_api_key() => Err(MatchdayError::Config(format!(
                "environment variable {} is not set (required by provider {})",
                self.llm.api_key_env, self.llm.provider
            ))),
            _ => Ok(None),
        }
    }

    /// Check the configuration before first use
    pub fn validate(&self) -> Result<()> {
        if self.form.window == 0 {
            return Err(MatchdayError::Config("form.window must be at least 1".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(MatchdayError::Config("llm.model must not be empty".to_string()));
        }
        if self.data.history.trim().is_empty() {
            return Err(MatchdayError::Config(
                "data.history must name a CSV file or URL".to_string(),
            ));
        }
        self.api_key()?;
        Ok(())
    }
}
